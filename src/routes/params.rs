use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Listing sort keys, passed through verbatim by the storefront. The server
/// owns the ordering semantics.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PetSort {
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PetListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub q: Option<String>,
    /// Comma-joined category ids. The storefront sends the selected detail
    /// categories when any are checked, else the single parent/root id.
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub gender: Option<String>,
    pub city: Option<String>,
    pub sort: Option<PetSort>,
}

impl PetListQuery {
    /// Parse the comma-joined `category` parameter; malformed ids are dropped.
    pub fn category_ids(&self) -> Vec<Uuid> {
        self.category
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|part| Uuid::parse_str(part.trim()).ok())
            .collect()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryListQuery {
    /// When present, the response is narrowed to the direct children of this
    /// category.
    pub parent: Option<Uuid>,
}

/// The storefront's filter-state contract for the pet listing.
///
/// Detail categories accumulate under one parent; switching the parent clears
/// the detail selection and resets pagination, and any filter change resets
/// pagination. `to_query` yields exactly the parameters `PetListQuery`
/// parses: details win over the parent when any are selected.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSelection {
    pub parent: Option<Uuid>,
    pub details: Vec<Uuid>,
    pub page: i64,
}

impl Default for ListingSelection {
    fn default() -> Self {
        Self {
            parent: None,
            details: Vec::new(),
            page: 1,
        }
    }
}

impl ListingSelection {
    pub fn select_parent(&mut self, parent: Option<Uuid>) {
        self.parent = parent;
        self.details.clear();
        self.page = 1;
    }

    pub fn toggle_detail(&mut self, detail: Uuid) {
        match self.details.iter().position(|id| *id == detail) {
            Some(pos) => {
                self.details.remove(pos);
            }
            None => self.details.push(detail),
        }
        self.page = 1;
    }

    pub fn set_page(&mut self, page: i64) {
        self.page = page.max(1);
    }

    /// The `category` parameter value: comma-joined details when any are
    /// selected, else the parent id.
    pub fn category_param(&self) -> Option<String> {
        if !self.details.is_empty() {
            let joined = self
                .details
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(",");
            return Some(joined);
        }
        self.parent.map(|id| id.to_string())
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(category) = self.category_param() {
            query.push(("category", category));
        }
        query.push(("page", self.page.to_string()));
        query
    }
}
