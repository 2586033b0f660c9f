/// file: src/connection_info.rs
/// description: connection-info view kept current by push-channel events
use crate::{
    bindings::{ContainerBinding, TextBinding, Visibility},
    message_socket::{MessageSocket, Subscription},
    types::{ConnectionStatusEvent, UPDATE_BALANCE, UPDATE_CONN_INFO, text_content},
};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Elements of the connection-info panel.
#[derive(Debug, Clone, Default)]
pub struct ConnectionInfoView {
    pub container: ContainerBinding,
    pub peers_connected: TextBinding,
    pub total_balance: TextBinding,
    pub latest_block: TextBinding,
    pub network_type: TextBinding,
}

pub struct ConnectionInfoController {
    view: ConnectionInfoView,
    attached: Cell<bool>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl ConnectionInfoController {
    pub fn new(view: ConnectionInfoView) -> Rc<Self> {
        Rc::new(Self {
            view,
            attached: Cell::new(false),
            subscriptions: RefCell::new(Vec::new()),
        })
    }

    pub fn view(&self) -> &ConnectionInfoView {
        &self.view
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// Registers the `updateConnInfo` and `updateBalance` handlers.
    ///
    /// Handlers hold a weak reference and do nothing once the controller is
    /// detached or dropped. Attaching twice keeps the first registration.
    pub fn attach(self: &Rc<Self>, socket: &MessageSocket) {
        if self.attached.get() {
            warn!("Connection info controller is already attached");
            return;
        }

        let conn_info = socket.register_evt_handler(
            UPDATE_CONN_INFO,
            Self::bound(Rc::downgrade(self), Self::update_conn_info),
        );
        let balance = socket.register_evt_handler(
            UPDATE_BALANCE,
            Self::bound(Rc::downgrade(self), Self::update_balance),
        );

        self.subscriptions.borrow_mut().extend([conn_info, balance]);
        self.attached.set(true);
        debug!("Connection info controller attached");
    }

    /// Releases every handler registration.
    pub fn detach(&self) {
        self.attached.set(false);
        let released = std::mem::take(&mut *self.subscriptions.borrow_mut());
        debug!(count = released.len(), "Connection info controller detached");
    }

    fn bound(
        controller: Weak<Self>,
        apply: fn(&Self, &Value),
    ) -> impl FnMut(&Value) + 'static {
        move |payload: &Value| match controller.upgrade() {
            Some(controller) if controller.is_attached() => apply(&controller, payload),
            _ => trace!("Dropping event for detached connection info view"),
        }
    }

    fn update_conn_info(&self, payload: &Value) {
        let event = ConnectionStatusEvent::from_payload(payload);

        self.view
            .peers_connected
            .set(text_content(event.peers_connected.as_ref()));
        self.view
            .total_balance
            .set(text_content(event.total_balance.as_ref()));
        self.view
            .latest_block
            .set(text_content(event.latest_block.as_ref()));
        self.view
            .network_type
            .set(text_content(event.network_type.as_ref()));

        self.view.container.set(Visibility::Visible);
    }

    fn update_balance(&self, payload: &Value) {
        self.view.total_balance.set(text_content(Some(payload)));
    }
}

impl Drop for ConnectionInfoController {
    fn drop(&mut self) {
        if self.attached.get() {
            self.detach();
        }
    }
}
