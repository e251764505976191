//! Predicate builder for product listings.
//!
//! A [`ProductQuery`] is a list of predicates combined with AND, one sort
//! key and one page. The postgres repository renders it to SQL; the
//! in-memory repository evaluates it directly with [`ProductQuery::evaluate`].

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{ProductError, ProductResult};
use crate::lifecycle::ProductStatus;
use crate::models::{
    ExpiredParams, LowStockParams, Product, ProductListParams, ProductType, SellingType,
    StockParams,
};

pub const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches no row. Used for filters that must yield an empty page.
    Nothing,
    /// Excludes soft-deleted rows
    Visible,
    StatusIs(ProductStatus),
    CategoryId(i64),
    BrandId(i64),
    UnitId(i64),
    SubCategoryId(i64),
    StoreId(i64),
    WarehouseId(i64),
    ProductType(ProductType),
    SellingType(SellingType),
    /// Lowercased needle matched against name, sku and item code
    Search(String),
    /// quantity <= threshold, or <= qty_alert when no threshold is given
    LowStock { threshold: Option<i32> },
    /// expired_date set and on or before the given day
    ExpiredOn(NaiveDate),
}

impl Predicate {
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Predicate::Nothing => false,
            Predicate::Visible => product.status.is_visible(),
            Predicate::StatusIs(status) => product.status == *status,
            Predicate::CategoryId(id) => product.category_id == *id,
            Predicate::BrandId(id) => product.brand_id == *id,
            Predicate::UnitId(id) => product.unit_id == *id,
            Predicate::SubCategoryId(id) => product.sub_category_id == *id,
            Predicate::StoreId(id) => product.store_id == *id,
            Predicate::WarehouseId(id) => product.warehouse_id == *id,
            Predicate::ProductType(kind) => product.product_type == *kind,
            Predicate::SellingType(kind) => product.selling_type == Some(*kind),
            Predicate::Search(needle) => {
                product.name.to_lowercase().contains(needle)
                    || product.sku.to_lowercase().contains(needle)
                    || product
                        .item_code
                        .as_deref()
                        .is_some_and(|code| code.to_lowercase().contains(needle))
            }
            Predicate::LowStock { threshold } => {
                product.quantity <= threshold.unwrap_or(product.qty_alert)
            }
            Predicate::ExpiredOn(day) => product.expired_date.is_some_and(|d| d <= *day),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Sku,
    Slug,
    Price,
    Quantity,
    QtyAlert,
    Status,
    CreatedAt,
    UpdatedAt,
    ExpiredDate,
    ManufacturedDate,
}

impl SortField {
    /// Accepts camelCase and snake_case spellings.
    pub fn parse(raw: &str) -> ProductResult<SortField> {
        let key: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let field = match key.as_str() {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "sku" => SortField::Sku,
            "slug" => SortField::Slug,
            "price" => SortField::Price,
            "quantity" => SortField::Quantity,
            "qtyalert" => SortField::QtyAlert,
            "status" => SortField::Status,
            "createdat" => SortField::CreatedAt,
            "updatedat" => SortField::UpdatedAt,
            "expireddate" => SortField::ExpiredDate,
            "manufactureddate" => SortField::ManufacturedDate,
            _ => {
                return Err(ProductError::Validation(format!(
                    "Invalid sort field: {}",
                    raw
                )));
            }
        };
        Ok(field)
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Name => a.name.cmp(&b.name),
            SortField::Sku => a.sku.cmp(&b.sku),
            SortField::Slug => a.slug.cmp(&b.slug),
            SortField::Price => a.price.cmp(&b.price),
            SortField::Quantity => a.quantity.cmp(&b.quantity),
            SortField::QtyAlert => a.qty_alert.cmp(&b.qty_alert),
            SortField::Status => a.status.to_string().cmp(&b.status.to_string()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::ExpiredDate => nulls_last(a.expired_date, b.expired_date),
            SortField::ManufacturedDate => nulls_last(a.manufactured_date, b.manufactured_date),
        }
    }
}

fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` in any case is descending, everything else ascending.
    pub fn parse_lenient(raw: &str) -> SortDirection {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    fn resolve(
        sort_by: Option<&str>,
        sort_dir: Option<&str>,
        default: Sort,
    ) -> ProductResult<Sort> {
        let field = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => SortField::parse(raw)?,
            None => default.field,
        };
        let direction = match sort_dir.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => SortDirection::parse_lenient(raw),
            None => default.direction,
        };
        Ok(Sort { field, direction })
    }

    /// Ordering with id ascending as tie-break.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let primary = match self.direction {
            SortDirection::Asc => self.field.compare(a, b),
            SortDirection::Desc => self.field.compare(a, b).reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u64,
    pub size: u64,
}

impl PageRequest {
    /// Zero-based page. Size defaults to 10 and is capped at `max_size`.
    ///
    /// The row offset of the page must fit a signed 64-bit bind parameter.
    pub fn new(index: Option<u64>, size: Option<u64>, max_size: u64) -> ProductResult<Self> {
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size == 0 {
            return Err(ProductError::Validation(
                "size must be greater than 0".to_string(),
            ));
        }
        let size = size.min(max_size.max(1));
        let index = index.unwrap_or(0);
        match index.checked_mul(size) {
            Some(offset) if offset <= i64::MAX as u64 => Ok(Self { index, size }),
            _ => Err(ProductError::Validation(format!(
                "page {} is out of range",
                index
            ))),
        }
    }

    /// Rows skipped before this page; bounded by construction.
    pub fn offset(&self) -> u64 {
        self.index * self.size
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub index: u64,
    pub size: u64,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            index: request.index,
            size: request.size,
            total_items: 0,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total_items.div_ceil(self.size)
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            index: self.index,
            size: self.size,
            total_items: self.total_items,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub predicates: Vec<Predicate>,
    pub sort: Sort,
    pub page: PageRequest,
}

impl ProductQuery {
    /// True when some predicate can never match.
    pub fn is_empty_by_construction(&self) -> bool {
        self.predicates.contains(&Predicate::Nothing)
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.predicates.iter().all(|p| p.matches(product))
    }

    /// Filter, sort and page `rows` in memory.
    pub fn evaluate<'a, I>(&self, rows: I) -> Page<Product>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut matching: Vec<&Product> = rows.into_iter().filter(|p| self.matches(p)).collect();
        matching.sort_by(|a, b| self.sort.compare(a, b));

        let total_items = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(self.page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(self.page.size).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Page {
            items,
            index: self.page.index,
            size: self.page.size,
            total_items,
        }
    }

    /// Main listing: every filter, newest first.
    pub fn list(params: &ProductListParams, max_page_size: u64) -> ProductResult<Self> {
        let query = QueryBuilder::default()
            .status(params.status.as_deref())
            .search(params.search.as_deref())
            .id(params.category_id, Predicate::CategoryId)
            .id(params.brand_id, Predicate::BrandId)
            .id(params.unit_id, Predicate::UnitId)
            .id(params.sub_category_id, Predicate::SubCategoryId)
            .id(params.store_id, Predicate::StoreId)
            .id(params.warehouse_id, Predicate::WarehouseId)
            .product_type(params.product_type.as_deref())
            .selling_type(params.selling_type.as_deref())
            .build(
                Sort::resolve(
                    params.sort_by.as_deref(),
                    params.sort_dir.as_deref(),
                    Sort::new(SortField::CreatedAt, SortDirection::Desc),
                )?,
                PageRequest::new(params.page, params.size, max_page_size)?,
            );
        Ok(query)
    }

    /// Stock management: placement and classification filters only.
    pub fn stocks(params: &StockParams, max_page_size: u64) -> ProductResult<Self> {
        let query = QueryBuilder::default()
            .status(None)
            .search(params.search.as_deref())
            .id(params.store_id, Predicate::StoreId)
            .id(params.warehouse_id, Predicate::WarehouseId)
            .id(params.category_id, Predicate::CategoryId)
            .id(params.brand_id, Predicate::BrandId)
            .id(params.unit_id, Predicate::UnitId)
            .build(
                Sort::resolve(
                    params.sort_by.as_deref(),
                    params.sort_dir.as_deref(),
                    Sort::new(SortField::CreatedAt, SortDirection::Desc),
                )?,
                PageRequest::new(params.page, params.size, max_page_size)?,
            );
        Ok(query)
    }

    pub fn low_stock(params: &LowStockParams, max_page_size: u64) -> ProductResult<Self> {
        let query = QueryBuilder::default()
            .status(None)
            .with(Predicate::LowStock {
                threshold: params.threshold,
            })
            .build(
                Sort::resolve(
                    params.sort_by.as_deref(),
                    params.sort_dir.as_deref(),
                    Sort::new(SortField::Quantity, SortDirection::Asc),
                )?,
                PageRequest::new(params.page, params.size, max_page_size)?,
            );
        Ok(query)
    }

    pub fn expired(params: &ExpiredParams, today: NaiveDate, max_page_size: u64) -> ProductResult<Self> {
        let query = QueryBuilder::default()
            .status(None)
            .with(Predicate::ExpiredOn(today))
            .build(
                Sort::resolve(
                    params.sort_by.as_deref(),
                    params.sort_dir.as_deref(),
                    Sort::new(SortField::ExpiredDate, SortDirection::Asc),
                )?,
                PageRequest::new(params.page, params.size, max_page_size)?,
            );
        Ok(query)
    }
}

#[derive(Debug, Default)]
struct QueryBuilder {
    predicates: Vec<Predicate>,
}

impl QueryBuilder {
    fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Absent status hides DELETED rows. An explicit DELETED, or any value
    /// outside the status set, matches nothing.
    fn status(self, raw: Option<&str>) -> Self {
        match non_blank(raw) {
            None => self.with(Predicate::Visible),
            Some(value) => match value.parse::<ProductStatus>() {
                Ok(status) if status.is_visible() => self.with(Predicate::StatusIs(status)),
                Ok(_) => {
                    tracing::debug!("Status filter on deleted products answered with empty page");
                    self.with(Predicate::Nothing)
                }
                Err(_) => self.with(Predicate::Nothing),
            },
        }
    }

    fn search(self, raw: Option<&str>) -> Self {
        match non_blank(raw) {
            Some(needle) => self.with(Predicate::Search(needle.to_lowercase())),
            None => self,
        }
    }

    fn id(self, id: Option<i64>, predicate: fn(i64) -> Predicate) -> Self {
        match id {
            Some(id) => self.with(predicate(id)),
            None => self,
        }
    }

    fn product_type(self, raw: Option<&str>) -> Self {
        match non_blank(raw) {
            Some(value) => match value.parse::<ProductType>() {
                Ok(kind) => self.with(Predicate::ProductType(kind)),
                Err(_) => self.with(Predicate::Nothing),
            },
            None => self,
        }
    }

    fn selling_type(self, raw: Option<&str>) -> Self {
        match non_blank(raw) {
            Some(value) => match value.parse::<SellingType>() {
                Ok(kind) => self.with(Predicate::SellingType(kind)),
                Err(_) => self.with(Predicate::Nothing),
            },
            None => self,
        }
    }

    fn build(self, sort: Sort, page: PageRequest) -> ProductQuery {
        ProductQuery {
            predicates: self.predicates,
            sort,
            page,
        }
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
