//! SKU, slug and item code uniqueness.
//!
//! The checks here run before the write and are not atomic against
//! concurrent writers. The database unique indexes are the backstop; their
//! violations are mapped to the same [`ProductError::DuplicateKey`].

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product};

/// Maximum attempts to find an unused generated key.
const MAX_KEY_ATTEMPTS: usize = 10;
const SUFFIX_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UniqueKey {
    Sku,
    Slug,
    ItemCode,
}

impl UniqueKey {
    pub fn label(&self) -> &'static str {
        match self {
            UniqueKey::Sku => "SKU",
            UniqueKey::Slug => "Slug",
            UniqueKey::ItemCode => "Item code",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UniqueKey::Sku => "sku",
            UniqueKey::Slug => "slug",
            UniqueKey::ItemCode => "item_code",
        }
    }

    /// Map a unique index name back to its key.
    pub fn from_constraint(name: &str) -> Option<UniqueKey> {
        match name {
            "uq_products_sku" => Some(UniqueKey::Sku),
            "uq_products_slug" => Some(UniqueKey::Slug),
            "uq_products_item_code" => Some(UniqueKey::ItemCode),
            _ => None,
        }
    }

    pub fn constraint(&self) -> &'static str {
        match self {
            UniqueKey::Sku => "uq_products_sku",
            UniqueKey::Slug => "uq_products_slug",
            UniqueKey::ItemCode => "uq_products_item_code",
        }
    }

    pub fn duplicate(self, value: impl Into<String>) -> ProductError {
        ProductError::DuplicateKey {
            field: self,
            value: value.into(),
        }
    }
}

/// Existence check for a key value. Soft-deleted rows still hold their keys.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyLookup: Send {
    async fn key_taken(
        &mut self,
        key: UniqueKey,
        value: &str,
        exclude: Option<i64>,
    ) -> ProductResult<bool>;
}

async fn ensure_free<L>(lookup: &mut L, key: UniqueKey, value: &str, exclude: Option<i64>) -> ProductResult<()>
where
    L: KeyLookup + ?Sized,
{
    if lookup.key_taken(key, value, exclude).await? {
        return Err(key.duplicate(value));
    }
    Ok(())
}

/// Every key of a new product must be free. Item code only when present.
pub async fn check_create<L>(lookup: &mut L, draft: &NewProduct) -> ProductResult<()>
where
    L: KeyLookup + ?Sized,
{
    ensure_free(lookup, UniqueKey::Sku, &draft.sku, None).await?;
    ensure_free(lookup, UniqueKey::Slug, &draft.slug, None).await?;
    if let Some(item_code) = draft.item_code.as_deref() {
        ensure_free(lookup, UniqueKey::ItemCode, item_code, None).await?;
    }
    Ok(())
}

/// Only keys whose value differs from the stored one are checked.
pub async fn check_update<L>(lookup: &mut L, current: &Product, next: &Product) -> ProductResult<()>
where
    L: KeyLookup + ?Sized,
{
    let id = Some(current.id);
    if next.sku != current.sku {
        ensure_free(lookup, UniqueKey::Sku, &next.sku, id).await?;
    }
    if next.slug != current.slug {
        ensure_free(lookup, UniqueKey::Slug, &next.slug, id).await?;
    }
    if next.item_code != current.item_code {
        if let Some(item_code) = next.item_code.as_deref() {
            ensure_free(lookup, UniqueKey::ItemCode, item_code, id).await?;
        }
    }
    Ok(())
}

/// Five uppercase alphanumerics.
pub fn key_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..SUFFIX_LEN].to_uppercase()
}

/// Keys for a copy of `source`. Each candidate is checked before use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyKeys {
    pub sku: String,
    pub slug: String,
    pub item_code: Option<String>,
}

pub async fn copy_keys<L, S>(lookup: &mut L, source: &Product, mut suffix: S) -> ProductResult<CopyKeys>
where
    L: KeyLookup + ?Sized,
    S: FnMut() -> String,
{
    let sku = first_free(lookup, UniqueKey::Sku, &source.sku, |_| {
        format!("{}-{}", source.sku, suffix())
    })
    .await?;

    let plain_slug = format!("{}-copy", source.slug);
    let slug = first_free(lookup, UniqueKey::Slug, &source.slug, |attempt| {
        if attempt == 0 {
            plain_slug.clone()
        } else {
            format!("{}-{}", plain_slug, suffix().to_lowercase())
        }
    })
    .await?;

    let item_code = match source.item_code.as_deref() {
        Some(code) => Some(
            first_free(lookup, UniqueKey::ItemCode, code, |_| {
                format!("{}-{}", code, suffix())
            })
            .await?,
        ),
        None => None,
    };

    Ok(CopyKeys {
        sku,
        slug,
        item_code,
    })
}

async fn first_free<L, G>(
    lookup: &mut L,
    key: UniqueKey,
    source_value: &str,
    mut candidate: G,
) -> ProductResult<String>
where
    L: KeyLookup + ?Sized,
    G: FnMut(usize) -> String,
{
    for attempt in 0..MAX_KEY_ATTEMPTS {
        let value = candidate(attempt);
        if !lookup.key_taken(key, &value, None).await? {
            return Ok(value);
        }
        tracing::debug!(key = key.as_str(), %value, "Generated key already taken");
    }
    Err(key.duplicate(source_value))
}
