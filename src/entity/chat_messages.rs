use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "chat_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chat_conversations::Entity",
        from = "Column::ConversationId",
        to = "super::chat_conversations::Column::Id"
    )]
    ChatConversations,
}

impl Related<super::chat_conversations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChatConversations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
