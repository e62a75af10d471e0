use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    category_tree::{CategoryRecord, ParentRef, TreeRow},
    chat::ChatEvent,
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartItemDto, CartList, UpdateQuantityRequest},
        categories::{CategoryList, CategoryTree, CreateCategoryRequest, UpdateCategoryRequest},
        chat::{ConversationList, MessageList, OpenConversationRequest, SendMessageRequest},
        coupons::{
            CouponList, CreateCouponRequest, UpdateCouponRequest, ValidateCouponRequest,
            ValidateCouponResponse,
        },
        favorites::{AddFavoriteRequest, FavoritePetList},
        orders::{CheckoutRequest, OrderList, OrderWithItems, PayOrderRequest, UpdateOrderStatusRequest},
        pets::{CreatePetRequest, PetList, UpdatePetRequest},
        users::{UpdateProfileRequest, UserList},
    },
    models::{Category, CartItem, ChatMessage, Conversation, Coupon, Favorite, Order, OrderItem, Pet, User},
    order_status::OrderStatus,
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, categories, chat, coupons, favorites, health, orders, params, pets, seller, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        users::get_profile,
        users::update_profile,
        categories::list_categories,
        categories::category_tree,
        pets::list_pets,
        pets::get_pet,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        coupons::validate_coupon,
        favorites::add_favorite,
        favorites::remove_favorite,
        favorites::list_favorites,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::pay_order,
        orders::receive_order,
        orders::cancel_order,
        seller::list_pets,
        seller::create_pet,
        seller::update_pet,
        seller::delete_pet,
        seller::list_orders,
        seller::get_order,
        seller::update_order_status,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::create_category,
        admin::update_category,
        admin::delete_category,
        admin::list_coupons,
        admin::create_coupon,
        admin::update_coupon,
        admin::delete_coupon,
        admin::list_users,
        chat::list_conversations,
        chat::open_conversation,
        chat::list_messages,
        chat::send_message
    ),
    components(
        schemas(
            User,
            Category,
            Pet,
            CartItem,
            Favorite,
            Coupon,
            Order,
            OrderItem,
            Conversation,
            ChatMessage,
            ChatEvent,
            OrderStatus,
            ParentRef,
            CategoryRecord,
            TreeRow,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            UserList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CategoryTree,
            CreatePetRequest,
            UpdatePetRequest,
            PetList,
            AddToCartRequest,
            UpdateQuantityRequest,
            CartItemDto,
            CartList,
            ValidateCouponRequest,
            ValidateCouponResponse,
            CreateCouponRequest,
            UpdateCouponRequest,
            CouponList,
            AddFavoriteRequest,
            FavoritePetList,
            CheckoutRequest,
            PayOrderRequest,
            UpdateOrderStatusRequest,
            OrderList,
            OrderWithItems,
            OpenConversationRequest,
            SendMessageRequest,
            ConversationList,
            MessageList,
            params::Pagination,
            params::PetListQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Pet>,
            ApiResponse<PetList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CategoryTree>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "Profile endpoints"),
        (name = "Categories", description = "Category tree endpoints"),
        (name = "Pets", description = "Pet and accessory listing endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Coupons", description = "Coupon validation"),
        (name = "Favorites", description = "Favorite endpoints"),
        (name = "Orders", description = "Order and checkout endpoints"),
        (name = "Seller", description = "Seller console endpoints"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Chat", description = "Conversation and relay endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
