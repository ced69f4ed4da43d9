use crate::KitchenRepository;
use crate::model::BarcodeProduct;
use crate::result::RepoResult;
use tracing::debug;

/// Products known without asking anyone: barcode, name, brand, category.
const REFERENCE_PRODUCTS: &[(&str, &str, &str, &str)] = &[
    ("123456789", "Milk", "Fresh Farm", "dairy"),
    ("987654321", "Bread", "Bakery Fresh", "bakery"),
    ("456789123", "Bananas", "Tropical", "fruits"),
];

/// Where a lookup result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Stored,
    Reference,
    Placeholder,
}

impl LookupSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupSource::Stored => "stored",
            LookupSource::Reference => "reference",
            LookupSource::Placeholder => "placeholder",
        }
    }
}

pub fn reference_product(barcode: &str) -> Option<BarcodeProduct> {
    REFERENCE_PRODUCTS
        .iter()
        .find(|(code, ..)| *code == barcode)
        .map(|(code, name, brand, category)| BarcodeProduct {
            barcode: code.to_string(),
            name: name.to_string(),
            brand: Some(brand.to_string()),
            category: Some(category.to_string()),
        })
}

pub fn placeholder_product(barcode: &str) -> BarcodeProduct {
    BarcodeProduct {
        barcode: barcode.to_string(),
        name: format!("Product {barcode}"),
        brand: Some("Unknown".to_string()),
        category: Some("other".to_string()),
    }
}

/// Stored products win. A reference product is stored the first time it is looked up.
/// Unknown barcodes get a placeholder that is never stored.
///
/// Concurrent first lookups of one reference code all succeed: whoever loses the
/// insert gets the product the winner stored.
pub async fn lookup<R: KitchenRepository>(
    repo: &R,
    barcode: &str,
) -> RepoResult<(BarcodeProduct, LookupSource)> {
    if let Some(product) = repo.find::<BarcodeProduct>(barcode).await? {
        return Ok((product, LookupSource::Stored));
    }

    let Some(product) = reference_product(barcode) else {
        return Ok((placeholder_product(barcode), LookupSource::Placeholder));
    };

    debug!("storing reference product for barcode {barcode}");
    if let Err(insert_err) = repo.insert(&product).await {
        return match repo.find::<BarcodeProduct>(barcode).await? {
            Some(stored) => {
                debug!("barcode {barcode} was stored by a concurrent lookup");
                Ok((stored, LookupSource::Stored))
            }
            None => Err(insert_err),
        };
    }

    Ok((product, LookupSource::Reference))
}
