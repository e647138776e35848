//! Cart & Checkout Controller.
//!
//! The controller owns the cart, the view state, and the checkout state
//! machine. It is an explicitly owned state container: the embedding shell
//! constructs one per page session and routes every user event through its
//! methods; there are no ambient globals.
//!
//! Every mutation notifies the registered observers synchronously, in
//! subscription order, after the mutation it describes - the shell's
//! re-render hook hangs off that contract.
//!
//! Checkout state machine:
//!
//! ```text
//! Idle -> InFlight -> Idle         (session creation failed, retry allowed)
//!                  -> Redirecting  (terminal for this process: the page
//!                                   navigates away to the processor)
//!
//! Idle -> Success  -> Idle         (return marker seen at startup; reset
//!                                   only by the explicit "continue
//!                                   shopping" action)
//! ```

use gallery_core::{ArtworkId, CheckoutSessionId, Email};
use thiserror::Error;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{ArtworkRef, Cart};
use crate::checkout::{
    CheckoutError, CheckoutGateway, CheckoutLineItem, CheckoutRequest, CheckoutSession,
};
use crate::view::ViewState;

/// Query parameter whose presence on the entry URL signals a return from the
/// payment processor.
pub const RETURN_MARKER: &str = "session_id";

/// Where the checkout handoff currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    /// No attempt in progress.
    #[default]
    Idle,
    /// A session-creation request is in flight; repeat submission is
    /// disabled.
    InFlight,
    /// Session created; the page is navigating away. No return transition
    /// within this process.
    Redirecting,
    /// A fresh process detected the return marker; awaiting the explicit
    /// "continue shopping" reset.
    Success,
}

/// A mutation the controller performed, delivered to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    /// A line was added or merged; `quantity` is the line's new quantity.
    LineAdded { artwork_id: ArtworkId, quantity: u32 },
    /// A line was removed (explicitly, or via a quantity of 0).
    LineRemoved { artwork_id: ArtworkId },
    /// A line's quantity was replaced in place.
    QuantityChanged { artwork_id: ArtworkId, quantity: u32 },
    /// All lines were dropped.
    CartCleared,
    /// The checkout state machine moved.
    CheckoutStateChanged { state: CheckoutState },
    /// The displayed page changed.
    ViewChanged { view: ViewState },
}

/// Consumer of cart/view mutations.
///
/// Notification is synchronous and ordered with respect to the mutation
/// that caused it.
pub trait CartObserver {
    fn on_event(&mut self, event: &CartEvent);
}

/// Hard-navigation seam.
///
/// Redirecting the whole page to an external URL is a one-way,
/// boundary-crossing exit: the current page lifecycle ends here and nothing
/// after the call is guaranteed to run.
pub trait Navigator {
    fn redirect(&self, url: &str);
}

/// Errors surfaced to the visitor from the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutFlowError {
    /// Local guard: checkout on an empty cart never touches the network.
    #[error("your cart is empty")]
    EmptyCart,

    /// Local guard: a previous attempt has not resolved yet.
    #[error("a checkout attempt is already in progress")]
    AlreadyInFlight,

    /// Local guard: the checkout already handed off (`Redirecting`) or a
    /// prior success is awaiting its reset (`Success`); only
    /// [`CartController::continue_shopping`] re-arms it.
    #[error("checkout already completed for this session")]
    CheckoutComplete,

    /// The backend refused or the network failed; the cart is unchanged and
    /// retry is permitted.
    #[error(transparent)]
    Gateway(#[from] CheckoutError),
}

/// The cart & checkout controller.
#[derive(Default)]
pub struct CartController {
    cart: Cart,
    view: ViewState,
    checkout_state: CheckoutState,
    observers: Vec<Box<dyn CartObserver>>,
}

impl CartController {
    /// Create a controller with an empty cart on the home view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Observers are notified in subscription order.
    pub fn subscribe(&mut self, observer: Box<dyn CartObserver>) {
        self.observers.push(observer);
    }

    /// The cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The displayed page.
    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    /// The checkout state machine's current state.
    #[must_use]
    pub const fn checkout_state(&self) -> CheckoutState {
        self.checkout_state
    }

    // =========================================================================
    // Cart Mutations
    // =========================================================================

    /// Add one of `artwork` to the cart, merging by identifier.
    pub fn add_item(&mut self, artwork: ArtworkRef) {
        let artwork_id = artwork.id.clone();
        let quantity = self.cart.add(artwork);
        self.emit(&CartEvent::LineAdded {
            artwork_id,
            quantity,
        });
    }

    /// Remove the line for `artwork_id`; a no-op if absent.
    pub fn remove_item(&mut self, artwork_id: &ArtworkId) {
        if self.cart.remove(artwork_id) {
            self.emit(&CartEvent::LineRemoved {
                artwork_id: artwork_id.clone(),
            });
        }
    }

    /// Replace a line's quantity in place; 0 removes the line. Negative
    /// quantities are unrepresentable by construction. A no-op if absent.
    pub fn set_quantity(&mut self, artwork_id: &ArtworkId, quantity: u32) {
        match self.cart.set_quantity(artwork_id, quantity) {
            Some(0) => self.emit(&CartEvent::LineRemoved {
                artwork_id: artwork_id.clone(),
            }),
            Some(quantity) => self.emit(&CartEvent::QuantityChanged {
                artwork_id: artwork_id.clone(),
                quantity,
            }),
            None => {}
        }
    }

    /// The cart total, recomputed from the current lines.
    #[must_use]
    pub fn total(&self) -> gallery_core::Price {
        self.cart.total()
    }

    /// Change the displayed page.
    pub fn show_page(&mut self, view: ViewState) {
        if self.view != view {
            self.view = view.clone();
            self.emit(&CartEvent::ViewChanged { view });
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Snapshot the cart into a session-creation request and enter
    /// `InFlight`.
    ///
    /// The returned request owns its data: the cart stays editable while the
    /// request is in flight without disturbing the snapshot.
    ///
    /// # Errors
    ///
    /// Refused locally - no network - when the cart is empty or the state
    /// machine is not `Idle`: another attempt in flight, a handoff already
    /// performed (`Redirecting` is terminal for this process), or a success
    /// awaiting its explicit reset.
    pub fn begin_checkout(
        &mut self,
        customer_email: Option<Email>,
    ) -> Result<CheckoutRequest, CheckoutFlowError> {
        match self.checkout_state {
            CheckoutState::Idle => {}
            CheckoutState::InFlight => return Err(CheckoutFlowError::AlreadyInFlight),
            CheckoutState::Redirecting | CheckoutState::Success => {
                return Err(CheckoutFlowError::CheckoutComplete);
            }
        }
        if self.cart.is_empty() {
            return Err(CheckoutFlowError::EmptyCart);
        }

        let request = CheckoutRequest {
            items: self
                .cart
                .lines()
                .iter()
                .map(|line| CheckoutLineItem {
                    artwork_id: line.artwork.id.clone(),
                    quantity: line.quantity,
                })
                .collect(),
            customer_email,
            // Fresh key per attempt so the backend can dedupe a retry that
            // races a slow earlier request.
            idempotency_key: Uuid::new_v4(),
        };

        self.set_checkout_state(CheckoutState::InFlight);
        Ok(request)
    }

    /// Session created: enter `Redirecting`. Terminal for this process.
    pub fn complete_checkout(&mut self) {
        if self.checkout_state == CheckoutState::InFlight {
            self.set_checkout_state(CheckoutState::Redirecting);
        } else {
            warn!(state = ?self.checkout_state, "complete_checkout outside InFlight ignored");
        }
    }

    /// Session creation failed: return to `Idle` so the visitor may retry.
    /// The cart is left untouched.
    pub fn abort_checkout(&mut self) {
        if self.checkout_state == CheckoutState::InFlight {
            self.set_checkout_state(CheckoutState::Idle);
        } else {
            warn!(state = ?self.checkout_state, "abort_checkout outside InFlight ignored");
        }
    }

    /// Run the full checkout flow: guard, snapshot, create the session, and
    /// hand the browser to the processor.
    ///
    /// On success the navigator's redirect is the last thing this process is
    /// expected to do. On failure the cart and total are unchanged and the
    /// in-flight flag is cleared.
    ///
    /// # Errors
    ///
    /// [`CheckoutFlowError::EmptyCart`] and
    /// [`CheckoutFlowError::AlreadyInFlight`] are refused locally;
    /// [`CheckoutFlowError::Gateway`] carries a backend or transport
    /// failure.
    #[instrument(skip(self, gateway, navigator, customer_email))]
    pub async fn checkout<G, N>(
        &mut self,
        gateway: &G,
        navigator: &N,
        customer_email: Option<Email>,
    ) -> Result<CheckoutSession, CheckoutFlowError>
    where
        G: CheckoutGateway + ?Sized,
        N: Navigator + ?Sized,
    {
        let request = self.begin_checkout(customer_email)?;

        match gateway.create_session(&request).await {
            Ok(session) => {
                self.complete_checkout();
                navigator.redirect(&session.session_url);
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "checkout session creation failed");
                self.abort_checkout();
                Err(err.into())
            }
        }
    }

    // =========================================================================
    // Return Reconciliation
    // =========================================================================

    /// Reconcile state at process start from the entry URL's query string.
    ///
    /// If the return marker is present the prior checkout is assumed
    /// successful: the controller moves to `Success` and shows the success
    /// page. The cart is deliberately NOT cleared here - a spurious marker
    /// must not silently discard state; clearing waits for the explicit
    /// [`Self::continue_shopping`] action.
    ///
    /// Only the marker's presence is interpreted; its value is handed back
    /// so the shell may verify payment against the backend if it cares to.
    pub fn reconcile_return(&mut self, query: &str) -> Option<CheckoutSessionId> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let session_id = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key.as_ref() == RETURN_MARKER)
            .map(|(_, value)| CheckoutSessionId::new(value.into_owned()))?;

        self.set_checkout_state(CheckoutState::Success);
        self.show_page(ViewState::CheckoutSuccess);
        Some(session_id)
    }

    /// The explicit "continue shopping" action: clear the cart and return to
    /// the home view. The only combined reset of cart and view state.
    pub fn continue_shopping(&mut self) {
        if !self.cart.is_empty() {
            self.cart.clear();
            self.emit(&CartEvent::CartCleared);
        }
        if self.checkout_state != CheckoutState::Idle {
            self.set_checkout_state(CheckoutState::Idle);
        }
        self.show_page(ViewState::Home);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn set_checkout_state(&mut self, state: CheckoutState) {
        self.checkout_state = state;
        self.emit(&CartEvent::CheckoutStateChanged { state });
    }

    fn emit(&mut self, event: &CartEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;

    fn artwork(id: &str, price: &str) -> ArtworkRef {
        ArtworkRef {
            id: ArtworkId::new(id),
            title: format!("Untitled ({id})"),
            unit_price: price.parse().unwrap(),
            image_url: format!("https://images.example.com/{id}"),
        }
    }

    /// Observer that appends `(tag, event)` to a shared log.
    struct RecordingObserver {
        tag: u8,
        log: Rc<RefCell<Vec<(u8, CartEvent)>>>,
    }

    impl CartObserver for RecordingObserver {
        fn on_event(&mut self, event: &CartEvent) {
            self.log.borrow_mut().push((self.tag, event.clone()));
        }
    }

    /// Gateway that records requests and answers from a script.
    struct FakeGateway {
        calls: Cell<u32>,
        requests: RefCell<Vec<CheckoutRequest>>,
        fail: bool,
    }

    impl FakeGateway {
        fn succeeding() -> Self {
            Self {
                calls: Cell::new(0),
                requests: RefCell::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::succeeding()
            }
        }
    }

    impl CheckoutGateway for FakeGateway {
        async fn create_session(
            &self,
            request: &CheckoutRequest,
        ) -> Result<CheckoutSession, CheckoutError> {
            self.calls.set(self.calls.get() + 1);
            self.requests.borrow_mut().push(request.clone());
            if self.fail {
                return Err(CheckoutError::Api {
                    status: 500,
                    message: "session creation failed".to_string(),
                });
            }
            Ok(CheckoutSession {
                session_id: CheckoutSessionId::new("cs_test_1"),
                session_url: "https://pay.example.com/c/cs_test_1".to_string(),
                order_id: None,
            })
        }
    }

    struct RecordingNavigator {
        redirects: RefCell<Vec<String>>,
    }

    impl RecordingNavigator {
        fn new() -> Self {
            Self {
                redirects: RefCell::new(Vec::new()),
            }
        }
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, url: &str) {
            self.redirects.borrow_mut().push(url.to_string());
        }
    }

    #[test]
    fn test_mutations_emit_events() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut controller = CartController::new();
        controller.subscribe(Box::new(RecordingObserver {
            tag: 0,
            log: Rc::clone(&log),
        }));

        controller.add_item(artwork("a", "100.00"));
        controller.add_item(artwork("a", "100.00"));
        controller.set_quantity(&ArtworkId::new("a"), 5);
        controller.set_quantity(&ArtworkId::new("a"), 0);
        controller.remove_item(&ArtworkId::new("a")); // absent: no event

        let events: Vec<CartEvent> =
            log.borrow().iter().map(|(_, event)| event.clone()).collect();
        assert_eq!(
            events,
            vec![
                CartEvent::LineAdded {
                    artwork_id: ArtworkId::new("a"),
                    quantity: 1
                },
                CartEvent::LineAdded {
                    artwork_id: ArtworkId::new("a"),
                    quantity: 2
                },
                CartEvent::QuantityChanged {
                    artwork_id: ArtworkId::new("a"),
                    quantity: 5
                },
                CartEvent::LineRemoved {
                    artwork_id: ArtworkId::new("a")
                },
            ]
        );
    }

    #[test]
    fn test_observers_notified_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut controller = CartController::new();
        for tag in [1, 2] {
            controller.subscribe(Box::new(RecordingObserver {
                tag,
                log: Rc::clone(&log),
            }));
        }

        controller.add_item(artwork("a", "1"));
        controller.remove_item(&ArtworkId::new("a"));

        let tags: Vec<u8> = log.borrow().iter().map(|(tag, _)| *tag).collect();
        // Both observers per event, in subscription order each time.
        assert_eq!(tags, [1, 2, 1, 2]);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_never_hits_network() {
        let gateway = FakeGateway::succeeding();
        let navigator = RecordingNavigator::new();
        let mut controller = CartController::new();

        let result = controller.checkout(&gateway, &navigator, None).await;

        assert!(matches!(result, Err(CheckoutFlowError::EmptyCart)));
        assert_eq!(gateway.calls.get(), 0);
        assert!(controller.cart().is_empty());
        assert_eq!(controller.checkout_state(), CheckoutState::Idle);
        assert!(navigator.redirects.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_success_redirects() {
        let gateway = FakeGateway::succeeding();
        let navigator = RecordingNavigator::new();
        let mut controller = CartController::new();
        controller.add_item(artwork("a", "850.00"));

        let session = controller
            .checkout(&gateway, &navigator, Some("c@example.com".parse().unwrap()))
            .await
            .unwrap();

        assert_eq!(controller.checkout_state(), CheckoutState::Redirecting);
        assert_eq!(
            navigator.redirects.borrow().as_slice(),
            ["https://pay.example.com/c/cs_test_1"]
        );
        assert_eq!(session.session_id, CheckoutSessionId::new("cs_test_1"));

        let requests = gateway.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].items,
            vec![CheckoutLineItem {
                artwork_id: ArtworkId::new("a"),
                quantity: 1
            }]
        );
        assert_eq!(
            requests[0].customer_email.as_ref().unwrap().as_str(),
            "c@example.com"
        );
    }

    #[tokio::test]
    async fn test_checkout_failure_leaves_cart_unchanged() {
        let gateway = FakeGateway::failing();
        let navigator = RecordingNavigator::new();
        let mut controller = CartController::new();
        controller.add_item(artwork("a", "850.00"));
        controller.add_item(artwork("b", "720.00"));
        let total_before = controller.total();

        let result = controller.checkout(&gateway, &navigator, None).await;

        assert!(matches!(result, Err(CheckoutFlowError::Gateway(_))));
        assert_eq!(gateway.calls.get(), 1);
        assert_eq!(controller.cart().line_count(), 2);
        assert_eq!(controller.total(), total_before);
        // In-flight flag cleared: the visitor may retry.
        assert_eq!(controller.checkout_state(), CheckoutState::Idle);
        assert!(navigator.redirects.borrow().is_empty());
    }

    #[test]
    fn test_second_submission_refused_while_in_flight() {
        let mut controller = CartController::new();
        controller.add_item(artwork("a", "1"));

        let first = controller.begin_checkout(None);
        assert!(first.is_ok());
        assert_eq!(controller.checkout_state(), CheckoutState::InFlight);

        let second = controller.begin_checkout(None);
        assert!(matches!(second, Err(CheckoutFlowError::AlreadyInFlight)));
    }

    #[test]
    fn test_redirecting_is_terminal_for_the_process() {
        let mut controller = CartController::new();
        controller.add_item(artwork("a", "1"));
        controller.begin_checkout(None).unwrap();
        controller.complete_checkout();
        assert_eq!(controller.checkout_state(), CheckoutState::Redirecting);

        // The page is navigating away; a second handoff must be refused and
        // the state must not move.
        let again = controller.begin_checkout(None);
        assert!(matches!(again, Err(CheckoutFlowError::CheckoutComplete)));
        assert_eq!(controller.checkout_state(), CheckoutState::Redirecting);
    }

    #[test]
    fn test_success_resets_only_via_continue_shopping() {
        let mut controller = CartController::new();
        controller.add_item(artwork("a", "1"));
        controller.reconcile_return("?session_id=cs_live_7");
        assert_eq!(controller.checkout_state(), CheckoutState::Success);

        let refused = controller.begin_checkout(None);
        assert!(matches!(refused, Err(CheckoutFlowError::CheckoutComplete)));
        assert_eq!(controller.checkout_state(), CheckoutState::Success);
        assert_eq!(*controller.view(), ViewState::CheckoutSuccess);

        controller.continue_shopping();
        controller.add_item(artwork("b", "2"));
        assert!(controller.begin_checkout(None).is_ok());
    }

    #[test]
    fn test_cart_stays_editable_while_in_flight() {
        let mut controller = CartController::new();
        controller.add_item(artwork("a", "1"));

        let request = controller.begin_checkout(None).unwrap();
        controller.add_item(artwork("b", "2"));
        controller.set_quantity(&ArtworkId::new("a"), 4);

        // The snapshot already taken is not disturbed by later edits.
        assert_eq!(
            request.items,
            vec![CheckoutLineItem {
                artwork_id: ArtworkId::new("a"),
                quantity: 1
            }]
        );
        assert_eq!(controller.cart().line_count(), 2);
    }

    #[test]
    fn test_idempotency_key_fresh_per_attempt() {
        let mut controller = CartController::new();
        controller.add_item(artwork("a", "1"));

        let first = controller.begin_checkout(None).unwrap();
        controller.abort_checkout();
        let second = controller.begin_checkout(None).unwrap();

        assert_ne!(first.idempotency_key, second.idempotency_key);
    }

    #[test]
    fn test_reconcile_return_detects_marker_without_clearing_cart() {
        let mut controller = CartController::new();
        controller.add_item(artwork("a", "100.00"));

        let session_id = controller.reconcile_return("?session_id=cs_live_42&foo=bar");

        assert_eq!(session_id, Some(CheckoutSessionId::new("cs_live_42")));
        assert_eq!(controller.checkout_state(), CheckoutState::Success);
        assert_eq!(*controller.view(), ViewState::CheckoutSuccess);
        // Deliberately NOT cleared until the explicit action.
        assert_eq!(controller.cart().line_count(), 1);

        controller.continue_shopping();
        assert!(controller.cart().is_empty());
        assert_eq!(*controller.view(), ViewState::Home);
        assert_eq!(controller.checkout_state(), CheckoutState::Idle);
    }

    #[test]
    fn test_reconcile_return_without_marker_is_noop() {
        let mut controller = CartController::new();
        controller.add_item(artwork("a", "1"));

        assert_eq!(controller.reconcile_return("utm_source=newsletter"), None);
        assert_eq!(controller.reconcile_return(""), None);
        assert_eq!(controller.checkout_state(), CheckoutState::Idle);
        assert_eq!(*controller.view(), ViewState::Home);
        assert_eq!(controller.cart().line_count(), 1);
    }

    #[test]
    fn test_show_page_emits_only_on_change() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut controller = CartController::new();
        controller.subscribe(Box::new(RecordingObserver {
            tag: 0,
            log: Rc::clone(&log),
        }));

        controller.show_page(ViewState::Home); // already home: no event
        controller.show_page(ViewState::Gallery {
            category: Some("abstract".to_string()),
        });

        assert_eq!(log.borrow().len(), 1);
    }
}
