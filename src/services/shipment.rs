//! Saving shipments and requesting carrier labels from the admin panel.

use crate::domain::package::build_label_rows;
use crate::domain::types::OrderId;
use crate::domain::validation::{ShipmentRule, ShipmentValidator, ValidationResult};
use crate::dto::shipment::{
    LabelResponse, Notice, RequestContext, SaveShipmentOutcome, ShipmentResponse,
};
use crate::forms::FormError;
use crate::forms::shipment::ShipmentSubmission;
use crate::repository::{OrderReader, ShipmentWriter};
use crate::services::loader::{ShipmentLoadQuery, ShipmentLoader};
use crate::services::{
    ENTITY_NOT_FOUND, LabelGenerator, ServiceError, ServiceResult, ShipmentSender,
};

pub const ORDER_INDEX_PATH: &str = "sales/order/index";
pub const ORDER_VIEW_PATH: &str = "sales/order/view";
pub const NEW_SHIPMENT_PATH: &str = "sales/order_shipment/new";
pub const NO_ROUTE: &str = "noroute";

pub const CANNOT_SAVE_NOW: &str = "We can't save the shipment right now.";
pub const SHIPMENT_CREATED: &str = "The shipment has been created.";
pub const LABEL_CREATED: &str = "You created the shipping label.";
pub const LABEL_FAILED: &str = "An error occurred while creating shipping label.";
pub const CANNOT_SAVE: &str = "Cannot save shipment.";
pub const VALIDATION_ERRORS_HEADER: &str = "Shipment Document Validation Error(s):";

/// Collaborators the handler delegates to.
pub struct ShipmentCollaborators<'a> {
    pub orders: &'a dyn OrderReader,
    pub loader: &'a dyn ShipmentLoader,
    pub validator: &'a dyn ShipmentValidator,
    pub labels: &'a dyn LabelGenerator,
    pub sender: &'a dyn ShipmentSender,
    pub writer: &'a dyn ShipmentWriter,
}

/// Submitted body plus the request facts the precondition needs.
#[derive(Debug)]
pub struct SaveShipmentRequest {
    pub submission: ShipmentSubmission,
    pub is_post: bool,
    /// Form key issued to this session, if any.
    pub session_form_key: Option<String>,
}

enum SaveResult {
    Saved(OrderId),
    NoRoute,
    Rejected(ValidationResult),
}

/// Handles the "save shipment" admin action.
///
/// With `shipment[create_shipping_label]` set the packages are turned into
/// label rows and handed to the label generator; the answer is always JSON.
/// Otherwise the shipment is loaded, validated, registered and saved with its
/// order, and the answer is a redirect.
pub fn save_shipment(
    request: SaveShipmentRequest,
    context: &mut RequestContext,
    collaborators: &ShipmentCollaborators<'_>,
) -> SaveShipmentOutcome {
    if !request.is_post || !form_key_matches(&request) {
        return SaveShipmentOutcome {
            response: ShipmentResponse::redirect(ORDER_INDEX_PATH),
            notices: vec![Notice::error(CANNOT_SAVE_NOW)],
        };
    }

    let submission = request.submission;
    if let Some(text) = &submission.comment_text {
        context.staged_comment = Some(text.clone());
    }

    if submission.create_shipping_label {
        return match create_shipping_label(submission, collaborators) {
            Ok(()) => {
                context.staged_comment = None;
                SaveShipmentOutcome {
                    response: ShipmentResponse::Json(LabelResponse::ok()),
                    notices: vec![Notice::success(format!(
                        "{SHIPMENT_CREATED} {LABEL_CREATED}"
                    ))],
                }
            }
            Err(err) => {
                let message = match err.user_message() {
                    Some(message) => {
                        log::warn!("Shipping label was not created: {err}");
                        message
                    }
                    None => {
                        log::error!("Failed to create shipping label: {err}");
                        LABEL_FAILED.to_string()
                    }
                };
                SaveShipmentOutcome {
                    response: ShipmentResponse::Json(LabelResponse::error(message)),
                    notices: Vec::new(),
                }
            }
        };
    }

    let raw_order_id = submission.order_id.clone();
    let back_to_form = ShipmentResponse::redirect_with_order(NEW_SHIPMENT_PATH, &raw_order_id);

    match save(submission, collaborators) {
        Ok(SaveResult::Saved(order_id)) => {
            context.staged_comment = None;
            SaveShipmentOutcome {
                response: ShipmentResponse::redirect_with_order(ORDER_VIEW_PATH, order_id),
                notices: vec![Notice::success(SHIPMENT_CREATED)],
            }
        }
        Ok(SaveResult::NoRoute) => SaveShipmentOutcome {
            response: ShipmentResponse::Forward(NO_ROUTE.to_string()),
            notices: Vec::new(),
        },
        Ok(SaveResult::Rejected(validation)) => SaveShipmentOutcome {
            response: back_to_form,
            notices: vec![Notice::error(format!(
                "{VALIDATION_ERRORS_HEADER}\n{}",
                validation.messages().join("\n")
            ))],
        },
        Err(err) => {
            let message = match err.user_message() {
                Some(message) => {
                    log::warn!("Shipment for order {raw_order_id} was not saved: {err}");
                    message
                }
                None => {
                    log::error!("Failed to save shipment for order {raw_order_id}: {err}");
                    CANNOT_SAVE.to_string()
                }
            };
            SaveShipmentOutcome {
                response: back_to_form,
                notices: vec![Notice::error(message)],
            }
        }
    }
}

fn form_key_matches(request: &SaveShipmentRequest) -> bool {
    match (&request.submission.form_key, &request.session_form_key) {
        (Some(submitted), Some(expected)) => !expected.is_empty() && submitted == expected,
        _ => false,
    }
}

fn create_shipping_label(
    submission: ShipmentSubmission,
    collaborators: &ShipmentCollaborators<'_>,
) -> ServiceResult<()> {
    let payload = submission.label_request()?;

    let mut order = collaborators
        .orders
        .get_order(payload.order_id)?
        .ok_or_else(|| ServiceError::Localized(ENTITY_NOT_FOUND.to_string()))?;

    order.extra_shipping_data = build_label_rows(&payload.packages, &payload.general_data)?;

    collaborators
        .labels
        .generate_shipping_label(&order, None, &payload.packages)?;

    order.customer_note_notify = payload.send_email;
    log::info!(
        "Requested {} shipping label(s) for order {}",
        payload.packages.len(),
        order.increment_id
    );

    Ok(())
}

fn save(
    submission: ShipmentSubmission,
    collaborators: &ShipmentCollaborators<'_>,
) -> ServiceResult<SaveResult> {
    let payload = match submission.shipment() {
        Ok(payload) => payload,
        Err(FormError::InvalidOrderId | FormError::InvalidShipmentId) => {
            return Ok(SaveResult::NoRoute);
        }
        Err(err) => return Err(err.into()),
    };

    let query = ShipmentLoadQuery::new(payload.order_id)
        .shipment_id(payload.shipment_id)
        .items(payload.items)
        .tracking(payload.tracking);

    let Some(mut shipment) = collaborators.loader.load(query)? else {
        return Ok(SaveResult::NoRoute);
    };

    if let Some(comment) = &payload.comment {
        shipment.add_comment(&comment.text, comment.notify_customer, comment.visible_on_front);
        shipment.customer_note = Some(comment.text.clone());
        shipment.customer_note_notify = comment.notify_customer;
        shipment.order.customer_note = Some(comment.text.clone());
    }

    let validation = collaborators
        .validator
        .validate(&shipment, &[ShipmentRule::Quantity]);
    if validation.has_messages() {
        return Ok(SaveResult::Rejected(validation));
    }

    shipment.register()?;
    shipment.order.customer_note_notify = payload.send_email;
    shipment.order.is_in_process = true;

    let shipment_id = collaborators.writer.save_shipment_with_order(&shipment)?;
    shipment.id = Some(shipment_id);
    log::info!(
        "Saved shipment {shipment_id} for order {}",
        shipment.order.increment_id
    );

    if payload.send_email {
        collaborators.sender.send(&shipment)?;
    }

    Ok(SaveResult::Saved(shipment.order.id))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::domain::order::tests::sample_order;
    use crate::domain::shipment::{Shipment, ShipmentState};
    use crate::domain::types::{OrderItemId, ShipmentId};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::INVALID_FORM;
    use crate::services::mock::{MockLabels, MockLoader, MockSender, MockValidator};

    const FORM_KEY: &str = "k3y";

    struct Mocks {
        repo: MockRepository,
        loader: MockLoader,
        validator: MockValidator,
        labels: MockLabels,
        sender: MockSender,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                repo: MockRepository::new(),
                loader: MockLoader::new(),
                validator: MockValidator::new(),
                labels: MockLabels::new(),
                sender: MockSender::new(),
            }
        }

        /// Every collaborator must stay untouched.
        fn untouched() -> Self {
            let mut mocks = Self::new();
            mocks.repo.expect_get_order().times(0);
            mocks.repo.expect_save_shipment_with_order().times(0);
            mocks.loader.expect_load().times(0);
            mocks.validator.expect_validate().times(0);
            mocks.labels.expect_generate_shipping_label().times(0);
            mocks.sender.expect_send().times(0);
            mocks
        }

        fn run(&self, body: &str, context: &mut RequestContext) -> SaveShipmentOutcome {
            self.run_request(post(body), context)
        }

        fn run_request(
            &self,
            request: SaveShipmentRequest,
            context: &mut RequestContext,
        ) -> SaveShipmentOutcome {
            let collaborators = ShipmentCollaborators {
                orders: &self.repo,
                loader: &self.loader,
                validator: &self.validator,
                labels: &self.labels,
                sender: &self.sender,
                writer: &self.repo,
            };
            save_shipment(request, context, &collaborators)
        }
    }

    fn post(body: &str) -> SaveShipmentRequest {
        SaveShipmentRequest {
            submission: ShipmentSubmission::from_body(body.as_bytes()),
            is_post: true,
            session_form_key: Some(FORM_KEY.to_string()),
        }
    }

    fn loaded_shipment() -> Shipment {
        let mut shipment = Shipment::new(sample_order());
        shipment.add_item(OrderItemId::new(11).unwrap(), 2.0);
        shipment
    }

    fn json(outcome: &SaveShipmentOutcome) -> Value {
        match &outcome.response {
            ShipmentResponse::Json(body) => serde_json::to_value(body).unwrap(),
            other => panic!("expected json response, got {other:?}"),
        }
    }

    #[test]
    fn missing_form_key_redirects_to_order_list() {
        let mocks = Mocks::untouched();
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "order_id=5&shipment[comment_text]=Hi&shipment[create_shipping_label]=1",
            &mut context,
        );

        assert_eq!(outcome.response, ShipmentResponse::redirect(ORDER_INDEX_PATH));
        assert_eq!(outcome.notices, vec![Notice::error(CANNOT_SAVE_NOW)]);
        assert_eq!(context.staged_comment, None);
    }

    #[test]
    fn wrong_form_key_or_method_is_rejected() {
        let mocks = Mocks::untouched();
        let mut context = RequestContext::default();

        let outcome = mocks.run("form_key=other&order_id=5", &mut context);
        assert_eq!(outcome.response, ShipmentResponse::redirect(ORDER_INDEX_PATH));

        let mut request = post("form_key=k3y&order_id=5");
        request.is_post = false;
        let outcome = mocks.run_request(request, &mut context);
        assert_eq!(outcome.response, ShipmentResponse::redirect(ORDER_INDEX_PATH));

        let mut request = post("form_key=k3y&order_id=5");
        request.session_form_key = None;
        let outcome = mocks.run_request(request, &mut context);
        assert_eq!(outcome.response, ShipmentResponse::redirect(ORDER_INDEX_PATH));
    }

    #[test]
    fn label_request_attaches_rows_and_answers_ok() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_get_order()
            .withf(|id| id.get() == 5)
            .times(1)
            .returning(|_| Ok(Some(sample_order())));
        mocks
            .labels
            .expect_generate_shipping_label()
            .withf(|order, label_id, packages| {
                let row = &order.extra_shipping_data;
                order.id.get() == 5
                    && label_id.is_none()
                    && packages.len() == 1
                    && row.len() == 1
                    && row[0].code == "DPD"
                    && row[0].product_type == "STD"
                    && row[0].package_data.keys().copied().collect::<Vec<_>>() == vec![1]
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks.loader.expect_load().times(0);
        mocks.repo.expect_save_shipment_with_order().times(0);
        mocks.sender.expect_send().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment[create_shipping_label]=1&shipment[comment_text]=Hi\
&packages[1][params][shipping_product]=DPD&packages[1][params][product_type]=STD",
            &mut context,
        );

        assert_eq!(json(&outcome), serde_json::json!({"ok": true}));
        assert_eq!(
            outcome.notices,
            vec![Notice::success(
                "The shipment has been created. You created the shipping label."
            )]
        );
        assert_eq!(context.staged_comment, None);
    }

    #[test]
    fn label_rows_follow_package_positions() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_get_order()
            .returning(|_| Ok(Some(sample_order())));
        mocks
            .labels
            .expect_generate_shipping_label()
            .withf(|order, _, packages| {
                packages.len() == 3
                    && order
                        .extra_shipping_data
                        .iter()
                        .enumerate()
                        .all(|(index, row)| {
                            row.package_data.len() == 1
                                && row.package_data.get(&(index + 1)) == Some(&packages[index])
                        })
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment[create_shipping_label]=on\
&packages[7][params][shipping_product]=A&packages[7][params][product_type]=STD\
&packages[3][params][shipping_product]=B&packages[3][params][product_type]=STD\
&packages[9][params][shipping_product]=C&packages[9][params][product_type]=EXP",
            &mut context,
        );

        assert_eq!(json(&outcome), serde_json::json!({"ok": true}));
    }

    #[test]
    fn label_generator_message_is_returned_as_json_error() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_get_order()
            .returning(|_| Ok(Some(sample_order())));
        mocks
            .labels
            .expect_generate_shipping_label()
            .returning(|_, _, _| Err(ServiceError::Localized("Carrier rejected the address".into())));
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment[create_shipping_label]=1&shipment[comment_text]=Keep\
&packages[1][params][shipping_product]=DPD&packages[1][params][product_type]=STD",
            &mut context,
        );

        assert_eq!(
            json(&outcome),
            serde_json::json!({"error": true, "message": "Carrier rejected the address"})
        );
        assert!(outcome.notices.is_empty());
        assert_eq!(context.staged_comment.as_deref(), Some("Keep"));
    }

    #[test]
    fn unexpected_label_failures_hide_details() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_get_order()
            .returning(|_| Err(RepositoryError::ConnectionError("pool timed out".into())));
        mocks.labels.expect_generate_shipping_label().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment[create_shipping_label]=1\
&packages[1][params][shipping_product]=DPD&packages[1][params][product_type]=STD",
            &mut context,
        );

        assert_eq!(
            json(&outcome),
            serde_json::json!({"error": true, "message": LABEL_FAILED})
        );
    }

    #[test]
    fn malformed_package_fails_without_calling_the_generator() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_get_order()
            .returning(|_| Ok(Some(sample_order())));
        mocks.labels.expect_generate_shipping_label().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment[create_shipping_label]=1\
&packages[1][params][product_type]=STD",
            &mut context,
        );

        assert_eq!(
            json(&outcome),
            serde_json::json!({"error": true, "message": LABEL_FAILED})
        );
    }

    #[test]
    fn missing_order_is_reported_in_json() {
        let mut mocks = Mocks::new();
        mocks.repo.expect_get_order().returning(|_| Ok(None));
        mocks.labels.expect_generate_shipping_label().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=404&shipment[create_shipping_label]=1",
            &mut context,
        );

        assert_eq!(
            json(&outcome),
            serde_json::json!({"error": true, "message": ENTITY_NOT_FOUND})
        );
    }

    #[test]
    fn valid_shipment_is_registered_saved_and_emailed() {
        let mut mocks = Mocks::new();
        mocks
            .loader
            .expect_load()
            .withf(|query| {
                query.order_id.get() == 5
                    && query.shipment_id.is_none()
                    && query.items == vec![(OrderItemId::new(11).unwrap(), 2.0)]
                    && query.tracking.len() == 1
            })
            .times(1)
            .returning(|_| Ok(Some(loaded_shipment())));
        mocks
            .validator
            .expect_validate()
            .withf(|_, rules| rules.contains(&ShipmentRule::Quantity))
            .times(1)
            .returning(|_, _| ValidationResult::default());
        mocks
            .repo
            .expect_save_shipment_with_order()
            .withf(|shipment| {
                shipment.state == ShipmentState::Registered
                    && shipment.order.is_in_process
                    && shipment.order.customer_note_notify
                    && shipment.comments.len() == 1
                    && shipment.customer_note.as_deref() == Some("Handle with care")
                    && shipment.order.customer_note.as_deref() == Some("Handle with care")
            })
            .times(1)
            .returning(|_| Ok(ShipmentId::new(31).unwrap()));
        mocks
            .sender
            .expect_send()
            .withf(|shipment| shipment.id == ShipmentId::new(31).ok())
            .times(1)
            .returning(|_| Ok(()));
        mocks.labels.expect_generate_shipping_label().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment[send_email]=1&shipment[items][11]=2\
&shipment[comment_text]=Handle+with+care&shipment[comment_customer_notify]=1\
&tracking[1][carrier_code]=dpd&tracking[1][title]=DPD&tracking[1][number]=TRK1",
            &mut context,
        );

        assert_eq!(
            outcome.response.location().as_deref(),
            Some("/sales/order/view?order_id=5")
        );
        assert_eq!(outcome.notices, vec![Notice::success(SHIPMENT_CREATED)]);
        assert_eq!(context.staged_comment, None);
    }

    #[test]
    fn no_email_without_send_email_flag() {
        let mut mocks = Mocks::new();
        mocks
            .loader
            .expect_load()
            .returning(|_| Ok(Some(loaded_shipment())));
        mocks
            .validator
            .expect_validate()
            .returning(|_, _| ValidationResult::default());
        mocks
            .repo
            .expect_save_shipment_with_order()
            .withf(|shipment| !shipment.order.customer_note_notify)
            .times(1)
            .returning(|_| Ok(ShipmentId::new(1).unwrap()));
        mocks.sender.expect_send().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run("form_key=k3y&order_id=5&shipment[send_email]=0", &mut context);

        assert_eq!(
            outcome.response,
            ShipmentResponse::redirect_with_order(ORDER_VIEW_PATH, 5)
        );
    }

    #[test]
    fn validation_messages_block_persistence() {
        let mut mocks = Mocks::new();
        mocks
            .loader
            .expect_load()
            .returning(|_| Ok(Some(loaded_shipment())));
        mocks.validator.expect_validate().returning(|_, _| {
            let mut result = ValidationResult::default();
            result.add_message("first problem");
            result.add_message("second problem");
            result
        });
        mocks.repo.expect_save_shipment_with_order().times(0);
        mocks.sender.expect_send().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment[send_email]=1&shipment[comment_text]=Later",
            &mut context,
        );

        assert_eq!(
            outcome.response,
            ShipmentResponse::redirect_with_order(NEW_SHIPMENT_PATH, "5")
        );
        assert_eq!(
            outcome.notices,
            vec![Notice::error(
                "Shipment Document Validation Error(s):\nfirst problem\nsecond problem"
            )]
        );
        assert_eq!(context.staged_comment.as_deref(), Some("Later"));
    }

    #[test]
    fn unresolvable_shipment_forwards_to_noroute() {
        let mut mocks = Mocks::new();
        mocks.loader.expect_load().times(1).returning(|_| Ok(None));
        mocks.validator.expect_validate().times(0);
        mocks.repo.expect_save_shipment_with_order().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment_id=77&shipment[send_email]=1",
            &mut context,
        );

        assert_eq!(outcome.response, ShipmentResponse::Forward(NO_ROUTE.into()));
        assert!(outcome.notices.is_empty());
    }

    #[test]
    fn unparseable_order_id_forwards_to_noroute() {
        let mocks = Mocks::untouched();
        let mut context = RequestContext::default();

        let outcome = mocks.run("form_key=k3y&order_id=abc", &mut context);

        assert_eq!(outcome.response, ShipmentResponse::Forward(NO_ROUTE.into()));
    }

    #[test]
    fn existing_shipment_cannot_be_registered_again() {
        let mut mocks = Mocks::new();
        mocks.loader.expect_load().returning(|_| {
            let mut shipment = loaded_shipment();
            shipment.id = ShipmentId::new(8).ok();
            shipment.state = ShipmentState::Registered;
            Ok(Some(shipment))
        });
        mocks
            .validator
            .expect_validate()
            .returning(|_, _| ValidationResult::default());
        mocks.repo.expect_save_shipment_with_order().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run("form_key=k3y&order_id=5&shipment_id=8", &mut context);

        assert_eq!(
            outcome.response,
            ShipmentResponse::redirect_with_order(NEW_SHIPMENT_PATH, "5")
        );
        assert_eq!(
            outcome.notices,
            vec![Notice::error("We cannot register an existing shipment")]
        );
    }

    #[test]
    fn label_request_skips_shipment_lines() {
        let mut mocks = Mocks::new();
        mocks
            .repo
            .expect_get_order()
            .times(1)
            .returning(|_| Ok(Some(sample_order())));
        mocks
            .labels
            .expect_generate_shipping_label()
            .times(1)
            .returning(|_, _, _| Ok(()));
        mocks.loader.expect_load().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment_id=abc&shipment[items][x]=1\
&shipment[create_shipping_label]=1\
&packages[1][params][shipping_product]=DPD&packages[1][params][product_type]=STD",
            &mut context,
        );

        assert_eq!(json(&outcome), serde_json::json!({"ok": true}));
    }

    #[test]
    fn undecodable_label_request_answers_json_error() {
        let mocks = Mocks::untouched();
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment[create_shipping_label]=1&packages[1]=DPD\
&shipment[comment_text]=Keep",
            &mut context,
        );

        assert_eq!(
            json(&outcome),
            serde_json::json!({"error": true, "message": INVALID_FORM})
        );
        assert!(outcome.notices.is_empty());
        assert_eq!(context.staged_comment.as_deref(), Some("Keep"));
    }

    #[test]
    fn undecodable_shipment_returns_to_the_form() {
        let mocks = Mocks::untouched();
        let mut context = RequestContext::default();

        let outcome = mocks.run("form_key=k3y&order_id=5&tracking[1]=oops", &mut context);

        assert_eq!(
            outcome.response,
            ShipmentResponse::redirect_with_order(NEW_SHIPMENT_PATH, "5")
        );
        assert_eq!(outcome.notices, vec![Notice::error(INVALID_FORM)]);
    }

    #[test]
    fn overshipping_detected_on_save_is_shown() {
        let mut mocks = Mocks::new();
        mocks
            .loader
            .expect_load()
            .returning(|_| Ok(Some(loaded_shipment())));
        mocks
            .validator
            .expect_validate()
            .returning(|_, _| ValidationResult::default());
        mocks
            .repo
            .expect_save_shipment_with_order()
            .returning(|_| {
                Err(RepositoryError::Conflict(
                    "The quantity to ship must not be greater than the unshipped quantity for the product SKU \"SKU-A\".".into(),
                ))
            });
        mocks.sender.expect_send().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run("form_key=k3y&order_id=5&shipment[items][11]=2", &mut context);

        assert_eq!(
            outcome.notices,
            vec![Notice::error(
                "The quantity to ship must not be greater than the unshipped quantity for the product SKU \"SKU-A\"."
            )]
        );
    }

    #[test]
    fn persistence_failure_shows_generic_message() {
        let mut mocks = Mocks::new();
        mocks
            .loader
            .expect_load()
            .returning(|_| Ok(Some(loaded_shipment())));
        mocks
            .validator
            .expect_validate()
            .returning(|_, _| ValidationResult::default());
        mocks
            .repo
            .expect_save_shipment_with_order()
            .returning(|_| {
                Err(RepositoryError::ConstraintViolation {
                    kind: "foreign key",
                    message: "FOREIGN KEY constraint failed".into(),
                })
            });
        mocks.sender.expect_send().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run(
            "form_key=k3y&order_id=5&shipment[send_email]=1&shipment[comment_text]=Retry+me",
            &mut context,
        );

        assert_eq!(
            outcome.response,
            ShipmentResponse::redirect_with_order(NEW_SHIPMENT_PATH, "5")
        );
        assert_eq!(outcome.notices, vec![Notice::error(CANNOT_SAVE)]);
        assert_eq!(context.staged_comment.as_deref(), Some("Retry me"));
    }

    #[test]
    fn email_failure_after_commit_goes_through_error_path() {
        let mut mocks = Mocks::new();
        mocks
            .loader
            .expect_load()
            .returning(|_| Ok(Some(loaded_shipment())));
        mocks
            .validator
            .expect_validate()
            .returning(|_, _| ValidationResult::default());
        mocks
            .repo
            .expect_save_shipment_with_order()
            .times(1)
            .returning(|_| Ok(ShipmentId::new(2).unwrap()));
        mocks
            .sender
            .expect_send()
            .times(1)
            .returning(|_| Err(ServiceError::Publish("emailer offline".into())));
        let mut context = RequestContext::default();

        let outcome = mocks.run("form_key=k3y&order_id=5&shipment[send_email]=1", &mut context);

        assert_eq!(
            outcome.response,
            ShipmentResponse::redirect_with_order(NEW_SHIPMENT_PATH, "5")
        );
        assert_eq!(outcome.notices, vec![Notice::error(CANNOT_SAVE)]);
    }

    #[test]
    fn loader_errors_are_shown_verbatim() {
        let mut mocks = Mocks::new();
        mocks
            .loader
            .expect_load()
            .returning(|_| Err(ServiceError::Localized("Please enter a tracking number.".into())));
        mocks.repo.expect_save_shipment_with_order().times(0);
        let mut context = RequestContext::default();

        let outcome = mocks.run("form_key=k3y&order_id=5", &mut context);

        assert_eq!(
            outcome.notices,
            vec![Notice::error("Please enter a tracking number.")]
        );
    }
}
