//! Form submitted by the "new shipment" admin page.

use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::domain::package::Package;
use crate::domain::shipment::ShipmentTrack;
use crate::domain::types::{OrderId, OrderItemId, ShipmentId, parse_quantity};
use crate::forms::FormError;
use crate::forms::nested::{decode, is_set, is_truthy, ordered_list, parse_nested};

/// A posted body, split into the few scalars every request needs and the
/// remaining fields, which are only decoded once the branch is known.
#[derive(Debug)]
pub struct ShipmentSubmission {
    pub form_key: Option<String>,
    /// Order id exactly as submitted, for redirects back to the form.
    pub order_id: String,
    pub create_shipping_label: bool,
    /// Comment to keep for the next attempt, if any text was entered.
    pub comment_text: Option<String>,
    fields: Result<Value, FormError>,
}

/// Fields read by a label request.
#[derive(Debug, Default, Deserialize)]
pub struct LabelRequestForm {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub shipment: Map<String, Value>,
    #[serde(default, deserialize_with = "ordered_list")]
    pub packages: Vec<Package>,
}

/// Raw shipment form as posted by the browser.
#[derive(Debug, Default, Deserialize)]
pub struct SaveShipmentForm {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub shipment_id: Option<String>,
    #[serde(default)]
    pub shipment: Map<String, Value>,
    #[serde(default, deserialize_with = "ordered_list")]
    pub tracking: Vec<TrackingForm>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TrackingForm {
    #[serde(default)]
    pub carrier_code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

/// Typed view over the scalar fields of the `shipment[...]` block.
#[derive(Debug, Default, Deserialize, Validate)]
struct ShipmentFields {
    #[serde(default)]
    #[validate(length(max = 65535))]
    comment_text: Option<String>,
    #[serde(default)]
    items: Map<String, Value>,
}

/// Comment attached to the shipment.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentInput {
    pub text: String,
    pub notify_customer: bool,
    pub visible_on_front: bool,
}

/// Validated label request.
#[derive(Debug, Clone)]
pub struct LabelRequestPayload {
    pub order_id: OrderId,
    pub send_email: bool,
    pub packages: Vec<Package>,
    /// The whole `shipment[...]` block.
    pub general_data: Value,
}

/// Validated shipment form.
#[derive(Debug, Clone)]
pub struct SaveShipmentPayload {
    pub order_id: OrderId,
    pub shipment_id: Option<ShipmentId>,
    pub comment: Option<CommentInput>,
    pub send_email: bool,
    /// Requested quantities by order line, in submission order.
    pub items: Vec<(OrderItemId, f64)>,
    pub tracking: Vec<ShipmentTrack>,
}

/// A comment of `"0"` counts as no comment, like any other empty form value.
fn has_comment(text: &str) -> bool {
    !text.is_empty() && text != "0"
}

fn parse_order_id(raw: Option<&str>) -> Result<OrderId, FormError> {
    raw.ok_or(FormError::InvalidOrderId)?
        .parse::<OrderId>()
        .map_err(|_| FormError::InvalidOrderId)
}

impl ShipmentSubmission {
    /// Decodes a urlencoded request body. A body that cannot be decoded still
    /// yields a submission; the error surfaces when the fields are read.
    pub fn from_body(body: &[u8]) -> Self {
        let tree = match parse_nested(body) {
            Ok(tree) => tree,
            Err(err) => {
                return Self {
                    form_key: None,
                    order_id: String::new(),
                    create_shipping_label: false,
                    comment_text: None,
                    fields: Err(err),
                };
            }
        };

        let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_string);
        let shipment = tree.get("shipment");

        Self {
            form_key: text(tree.get("form_key")),
            order_id: text(tree.get("order_id")).unwrap_or_default(),
            create_shipping_label: is_truthy(
                shipment.and_then(|fields| fields.get("create_shipping_label")),
            ),
            comment_text: text(shipment.and_then(|fields| fields.get("comment_text")))
                .filter(|text| has_comment(text)),
            fields: Ok(tree),
        }
    }

    /// Reads the fields a label request needs.
    pub fn label_request(self) -> Result<LabelRequestPayload, FormError> {
        let form: LabelRequestForm = decode(self.fields?)?;
        LabelRequestPayload::try_from(form)
    }

    /// Reads the full shipment form.
    pub fn shipment(self) -> Result<SaveShipmentPayload, FormError> {
        let form: SaveShipmentForm = decode(self.fields?)?;
        SaveShipmentPayload::try_from(form)
    }
}

impl TryFrom<LabelRequestForm> for LabelRequestPayload {
    type Error = FormError;

    fn try_from(form: LabelRequestForm) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: parse_order_id(form.order_id.as_deref())?,
            send_email: is_truthy(form.shipment.get("send_email")),
            packages: form.packages,
            general_data: Value::Object(form.shipment),
        })
    }
}

impl TryFrom<SaveShipmentForm> for SaveShipmentPayload {
    type Error = FormError;

    fn try_from(form: SaveShipmentForm) -> Result<Self, Self::Error> {
        let order_id = parse_order_id(form.order_id.as_deref())?;

        let shipment_id = match form.shipment_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<ShipmentId>()
                    .map_err(|_| FormError::InvalidShipmentId)?,
            ),
        };

        let send_email = is_truthy(form.shipment.get("send_email"));
        let notify_customer = is_set(form.shipment.get("comment_customer_notify"));
        let visible_on_front = is_set(form.shipment.get("is_visible_on_front"));

        let fields: ShipmentFields = decode(Value::Object(form.shipment))?;
        fields.validate()?;

        // Stored as typed; escaping happens where the text is rendered.
        let comment = fields
            .comment_text
            .filter(|text| has_comment(text))
            .map(|text| CommentInput {
                text,
                notify_customer,
                visible_on_front,
            });

        let items = fields
            .items
            .iter()
            .map(|(id, qty)| {
                let item_id = id
                    .parse::<OrderItemId>()
                    .map_err(|_| FormError::InvalidItemId(id.clone()))?;
                let raw_qty = qty.as_str().unwrap_or_default();
                let qty = parse_quantity(raw_qty)
                    .map_err(|_| FormError::InvalidQuantity(raw_qty.to_string()))?;
                Ok((item_id, qty))
            })
            .collect::<Result<Vec<_>, FormError>>()?;

        let tracking = form
            .tracking
            .into_iter()
            .map(|track| ShipmentTrack {
                carrier_code: track.carrier_code.unwrap_or_else(|| "custom".to_string()),
                title: track.title.unwrap_or_default(),
                track_number: track.number.unwrap_or_default().trim().to_string(),
            })
            .collect();

        Ok(Self {
            order_id,
            shipment_id,
            comment,
            send_email,
            items,
            tracking,
        })
    }
}
