//! Packages submitted with a label request and the rows derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::errors::DomainError;

/// Carrier parameters of a single package.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PackageParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goods_description: Option<String>,
    /// Container, weight, dimensions and any other carrier specific values.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// One physical parcel of a shipment.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Package {
    #[serde(default)]
    pub params: PackageParams,
    /// Items, customs data and whatever else the admin form attached.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

/// Per-package context read by the label generator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequestRow {
    pub code: String,
    pub product_type: String,
    /// The whole submitted `shipment` block.
    pub shipment_general_data: Value,
    /// Exactly one entry: the package keyed by its 1-based position.
    pub package_data: BTreeMap<usize, Package>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LabelRequestRow {
    /// Builds the row for the package at 1-based position `package_id`.
    pub fn for_package(
        package_id: usize,
        package: &Package,
        shipment_general_data: &Value,
    ) -> Result<Self, DomainError> {
        let code = package
            .params
            .shipping_product
            .clone()
            .ok_or(DomainError::MissingField("shipping_product"))?;
        let product_type = package
            .params
            .product_type
            .clone()
            .ok_or(DomainError::MissingField("product_type"))?;

        Ok(Self {
            code,
            product_type,
            shipment_general_data: shipment_general_data.clone(),
            package_data: BTreeMap::from([(package_id, package.clone())]),
            expiration_date: package.params.expiration_date.clone(),
            description: package.params.goods_description.clone(),
        })
    }
}

/// Builds one row per package, numbering packages from 1 in submission order.
pub fn build_label_rows(
    packages: &[Package],
    shipment_general_data: &Value,
) -> Result<Vec<LabelRequestRow>, DomainError> {
    packages
        .iter()
        .enumerate()
        .map(|(index, package)| {
            LabelRequestRow::for_package(index + 1, package, shipment_general_data)
        })
        .collect()
}
