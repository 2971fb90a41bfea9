//! The hub: port table owner, inbound dispatcher, bring-up driver.
//!
//! A hub runs as one task owning all mutable state (port table, decoder,
//! property cache). Inbound notification chunks are decoded and every frame
//! is both forwarded to the transmission queue's correlation matcher and
//! folded into the port model. Bring-up queries and subscription sequences
//! run in detached waiter tasks whose resolutions come back over the hub's
//! command channel, so the event loop never blocks on the queue.

use crate::config::HubConfig;
use crate::error::HubError;
use crate::event::{HubEvent, PropertyValue};
use bytes::Bytes;
use hubkit_port::{
    resolve_combination_index, CombinedEntry, CombinedSubscription, Port, PortQuery, PortStatus,
    SubscriptionError,
};
use hubkit_queue::{QueueError, QueueHandle, QueueStats, TransmissionQueue, Transport};
use hubkit_wire::{
    ErrorCode, IoAttachmentEvent, OutputCommandFlags, PortCapabilities, PropertyKind,
    PropertyOperation, RequestBody, Response, ResponseBody, ResponseDecoder, Version,
    VirtualPortRequest,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Point-in-time copy of a hub's state for host-app consumption.
#[derive(Debug, Clone)]
pub struct HubSnapshot {
    /// Device identifier of the hub
    pub device_id: Uuid,
    /// Hub id byte used on the wire
    pub hub_id: u8,
    /// Registered ports, ordered by id
    pub ports: Vec<Port>,
    /// Cached hub properties
    pub properties: HashMap<PropertyKind, PropertyValue>,
}

enum HubCommand {
    Notification(Bytes),
    SetInputFormat {
        port: u8,
        mode: u8,
        delta: u32,
        notify: bool,
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    SubscribeValues {
        port: u8,
        entries: Vec<CombinedEntry>,
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    SetupVirtualPort {
        first: u8,
        second: u8,
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    DisconnectVirtualPort {
        port: u8,
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    Startup {
        reply: oneshot::Sender<()>,
    },
    WatchReady {
        port: u8,
        notify: oneshot::Sender<Result<(), HubError>>,
    },
    Snapshot {
        reply: oneshot::Sender<HubSnapshot>,
    },
    QueryResolved {
        port: u8,
        query: PortQuery,
        error: Option<QueueError>,
    },
    SequenceFailed {
        port: u8,
        error: QueueError,
    },
    Shutdown,
}

/// Cloneable handle to a spawned hub task.
#[derive(Clone)]
pub struct HubHandle {
    device_id: Uuid,
    cmd_tx: mpsc::UnboundedSender<HubCommand>,
    queue: QueueHandle,
}

impl HubHandle {
    /// Device identifier this hub was registered under.
    pub fn device_id(&self) -> Uuid {
        self.device_id
    }

    fn command(&self, command: HubCommand) -> Result<(), HubError> {
        self.cmd_tx.send(command).map_err(|_| HubError::Closed)
    }

    async fn roundtrip<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> HubCommand,
    ) -> Result<T, HubError> {
        let (reply, resolution) = oneshot::channel();
        self.command(build(reply))?;
        resolution.await.map_err(|_| HubError::Closed)
    }

    /// Feed one inbound notification chunk from the transport.
    ///
    /// Chunk boundaries are arbitrary; the decoder reassembles frames.
    pub fn notify(&self, chunk: impl Into<Bytes>) -> Result<(), HubError> {
        self.command(HubCommand::Notification(chunk.into()))
    }

    /// Submit a raw request and await its resolution.
    pub async fn request(&self, body: RequestBody) -> Result<Option<Response>, HubError> {
        self.queue.request(body).await.map_err(HubError::from)
    }

    /// Perform a hub action.
    pub async fn action(&self, action: hubkit_wire::HubAction) -> Result<(), HubError> {
        self.request(RequestBody::Action(action)).await.map(|_| ())
    }

    /// Request a single property update; the cache and event stream see it
    /// when the response is dispatched.
    pub async fn request_property_update(
        &self,
        property: PropertyKind,
    ) -> Result<Option<Response>, HubError> {
        self.request(RequestBody::Properties {
            property,
            operation: PropertyOperation::RequestUpdate,
            payload: Bytes::new(),
        })
        .await
    }

    /// Send an output command to a port.
    pub async fn output_command(
        &self,
        port: u8,
        flags: OutputCommandFlags,
        payload: Bytes,
    ) -> Result<Option<Response>, HubError> {
        self.request(RequestBody::OutputCommand {
            port,
            flags,
            payload,
        })
        .await
    }

    /// Set the single-mode input format of a port (subscribe with
    /// `notify = true`, unsubscribe with `notify = false`).
    pub async fn set_input_format(
        &self,
        port: u8,
        mode: u8,
        delta: u32,
        notify: bool,
    ) -> Result<(), HubError> {
        self.roundtrip(|reply| HubCommand::SetInputFormat {
            port,
            mode,
            delta,
            notify,
            reply,
        })
        .await?
    }

    /// Install a combined subscription over several (mode, dataset) pairs.
    ///
    /// Validation errors come back to the caller; failures of the setup
    /// sub-requests surface on the event stream instead.
    pub async fn subscribe_values(
        &self,
        port: u8,
        entries: Vec<CombinedEntry>,
    ) -> Result<(), HubError> {
        self.roundtrip(|reply| HubCommand::SubscribeValues {
            port,
            entries,
            reply,
        })
        .await?
    }

    /// Combine two registered ports into a virtual port.
    pub async fn setup_virtual_port(&self, first: u8, second: u8) -> Result<(), HubError> {
        self.roundtrip(|reply| HubCommand::SetupVirtualPort {
            first,
            second,
            reply,
        })
        .await?
    }

    /// Tear down a virtual port.
    pub async fn disconnect_virtual_port(&self, port: u8) -> Result<(), HubError> {
        self.roundtrip(|reply| HubCommand::DisconnectVirtualPort { port, reply })
            .await?
    }

    /// Run the connection-time workaround for the persistent virtual port:
    /// proactively disconnect it, ignoring any error.
    pub async fn startup(&self) -> Result<(), HubError> {
        self.roundtrip(|reply| HubCommand::Startup { reply }).await
    }

    /// Wait until a port finishes bring-up.
    pub async fn port_ready(&self, port: u8) -> Result<(), HubError> {
        self.roundtrip(|notify| HubCommand::WatchReady { port, notify })
            .await?
    }

    /// Point-in-time copy of the hub's ports and cached properties.
    pub async fn snapshot(&self) -> Result<HubSnapshot, HubError> {
        self.roundtrip(|reply| HubCommand::Snapshot { reply }).await
    }

    /// Snapshot of the transmission queue counters.
    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// Stop the hub task. Outstanding waiters resolve with `Closed`.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(HubCommand::Shutdown);
    }
}

/// The hub task: owns the port table and dispatches inbound traffic.
pub struct Hub {
    device_id: Uuid,
    config: HubConfig,
    decoder: ResponseDecoder,
    ports: HashMap<u8, Port>,
    properties: HashMap<PropertyKind, PropertyValue>,
    ready_waiters: HashMap<u8, Vec<oneshot::Sender<Result<(), HubError>>>>,
    queue: QueueHandle,
    events: mpsc::UnboundedSender<HubEvent>,
    cmd_tx: mpsc::UnboundedSender<HubCommand>,
    cmd_rx: mpsc::UnboundedReceiver<HubCommand>,
}

impl Hub {
    /// Spawn a hub task over `transport` and return its handle and event
    /// stream.
    pub fn spawn(
        device_id: Uuid,
        transport: Arc<dyn Transport>,
        config: HubConfig,
    ) -> (HubHandle, mpsc::UnboundedReceiver<HubEvent>) {
        let queue = TransmissionQueue::spawn(config.hub_id, transport, config.queue.clone());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let hub = Self {
            device_id,
            config,
            decoder: ResponseDecoder::new(),
            ports: HashMap::new(),
            properties: HashMap::new(),
            ready_waiters: HashMap::new(),
            queue: queue.clone(),
            events: event_tx,
            cmd_tx: cmd_tx.clone(),
            cmd_rx,
        };

        tokio::spawn(async move {
            if let Err(error) = hub.run().await {
                warn!(%error, "hub task ended with error");
            }
        });

        (
            HubHandle {
                device_id,
                cmd_tx,
                queue,
            },
            event_rx,
        )
    }

    /// Drive the hub event loop until shutdown.
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!(device_id = %self.device_id, "hub task started");
        while let Some(command) = self.cmd_rx.recv().await {
            if !self.handle_command(command) {
                break;
            }
        }
        info!(device_id = %self.device_id, "hub task stopped");
        Ok(())
    }

    fn handle_command(&mut self, command: HubCommand) -> bool {
        match command {
            HubCommand::Notification(chunk) => {
                for response in self.decoder.decode(&chunk) {
                    self.queue.dispatch(response.clone());
                    self.dispatch(response);
                }
            }
            HubCommand::SetInputFormat {
                port,
                mode,
                delta,
                notify,
                reply,
            } => self.handle_set_input_format(port, mode, delta, notify, reply),
            HubCommand::SubscribeValues {
                port,
                entries,
                reply,
            } => self.handle_subscribe_values(port, entries, reply),
            HubCommand::SetupVirtualPort {
                first,
                second,
                reply,
            } => self.handle_setup_virtual_port(first, second, reply),
            HubCommand::DisconnectVirtualPort { port, reply } => {
                self.handle_disconnect_virtual_port(port, reply);
            }
            HubCommand::Startup { reply } => self.handle_startup(reply),
            HubCommand::WatchReady { port, notify } => self.handle_watch_ready(port, notify),
            HubCommand::Snapshot { reply } => {
                let mut ports: Vec<Port> = self.ports.values().cloned().collect();
                ports.sort_by_key(Port::id);
                let _ = reply.send(HubSnapshot {
                    device_id: self.device_id,
                    hub_id: self.config.hub_id,
                    ports,
                    properties: self.properties.clone(),
                });
            }
            HubCommand::QueryResolved { port, query, error } => {
                self.handle_query_resolved(port, query, error);
            }
            HubCommand::SequenceFailed { port, error } => {
                warn!(port, %error, "subscription setup sub-request failed");
                self.emit(HubEvent::Error(HubError::Queue(error)));
            }
            HubCommand::Shutdown => return false,
        }
        true
    }

    fn emit(&self, event: HubEvent) {
        let _ = self.events.send(event);
    }

    /// Fold one decoded response into the port model and hub caches.
    fn dispatch(&mut self, response: Response) {
        match response.body {
            ResponseBody::AttachedIo(event) => self.handle_attached_io(event),
            ResponseBody::Properties {
                property, payload, ..
            } => {
                let value = parse_property(property, &payload);
                self.properties.insert(property, value.clone());
                self.emit(HubEvent::PropertyUpdated { property, value });
            }
            ResponseBody::Alert { alert, payload, .. } => {
                let active = payload.first().is_some_and(|b| *b != 0);
                self.emit(HubEvent::Alert { alert, active });
            }
            ResponseBody::Action(action) => self.emit(HubEvent::ActionNotice(action)),
            ResponseBody::Feedback { command, error } => {
                if error != ErrorCode::Ack {
                    self.emit(HubEvent::Error(HubError::Protocol { command, error }));
                }
            }
            ResponseBody::PortInformation { port, info } => {
                if let Some(p) = self.ports.get_mut(&port) {
                    p.apply_information(&info);
                } else {
                    debug!(port, "port information for unregistered port");
                }
            }
            ResponseBody::PortModeInformation { port, mode, info } => {
                if let Some(p) = self.ports.get_mut(&port) {
                    p.apply_mode_information(mode, &info);
                } else {
                    debug!(port, "mode information for unregistered port");
                }
            }
            ResponseBody::PortValueSingle { port, payload } => {
                let updated = self
                    .ports
                    .get_mut(&port)
                    .and_then(|p| p.apply_single_value(&payload));
                if let Some(values) = updated {
                    self.emit(HubEvent::PortUpdated { port, values });
                }
            }
            ResponseBody::PortValueCombined {
                port,
                entries,
                payload,
            } => {
                let updated = self
                    .ports
                    .get_mut(&port)
                    .and_then(|p| p.apply_combined_value(&entries, &payload));
                if let Some(values) = updated {
                    self.emit(HubEvent::PortUpdated { port, values });
                }
            }
            ResponseBody::InputFormatSingle {
                port,
                mode,
                delta,
                notify,
            } => {
                if let Some(p) = self.ports.get_mut(&port) {
                    p.commit_single_format(mode, delta, notify);
                }
            }
            ResponseBody::InputFormatCombined { port, .. } => {
                if let Some(p) = self.ports.get_mut(&port) {
                    p.commit_combined_format();
                }
            }
            ResponseBody::OutputFeedback { feedback } => {
                for (port, flags) in feedback {
                    self.emit(HubEvent::OutputFeedback {
                        port,
                        feedback: flags,
                    });
                }
            }
            ResponseBody::Network(update) => debug!(?update, "network update"),
            ResponseBody::LockStatus { locked } => debug!(locked, "lock status update"),
            ResponseBody::Unknown { message_type, .. } => {
                debug!(message_type, "body failed validation; kept as unknown");
            }
        }
    }

    fn handle_attached_io(&mut self, event: IoAttachmentEvent) {
        match event {
            IoAttachmentEvent::Attached {
                port,
                device,
                hw_version,
                sw_version,
            } => {
                debug!(port, ?device, "device attached");
                let mut new_port = Port::new(port, device);
                new_port.set_versions(hw_version, sw_version);
                let query = new_port.begin_bringup();
                self.ports.insert(port, new_port);
                self.emit(HubEvent::PortAdded { port, device });
                self.issue_query(port, query);
            }
            IoAttachmentEvent::AttachedVirtual {
                port,
                device,
                first,
                second,
            } => {
                for constituent in [first, second] {
                    if !self.ports.contains_key(&constituent) {
                        warn!(port, constituent, "virtual attach names unknown constituent");
                        self.emit(HubEvent::Error(HubError::MissingConstituent {
                            port,
                            constituent,
                        }));
                        return;
                    }
                }
                debug!(port, first, second, "virtual device attached");
                let mut new_port = Port::new_virtual(port, device, first, second);
                let query = new_port.begin_bringup();
                self.ports.insert(port, new_port);
                self.emit(HubEvent::PortAdded { port, device });
                self.issue_query(port, query);
            }
            IoAttachmentEvent::Detached { port } => {
                if self.ports.remove(&port).is_some() {
                    debug!(port, "device detached");
                    self.emit(HubEvent::PortRemoved { port });
                }
                if let Some(waiters) = self.ready_waiters.remove(&port) {
                    for waiter in waiters {
                        let _ = waiter.send(Err(HubError::UnknownPort(port)));
                    }
                }
            }
        }
    }

    /// Issue one bring-up query through the queue; its resolution comes back
    /// as a command so the event loop stays unblocked.
    fn issue_query(&self, port: u8, query: PortQuery) {
        trace!(port, ?query, "issuing bring-up query");
        let body = query.into_request(port);
        let queue = self.queue.clone();
        let cmd_tx = self.cmd_tx.clone();
        tokio::spawn(async move {
            let error = queue.request(body).await.err();
            let _ = cmd_tx.send(HubCommand::QueryResolved { port, query, error });
        });
    }

    fn handle_query_resolved(&mut self, port: u8, query: PortQuery, error: Option<QueueError>) {
        if let Some(error) = &error {
            self.emit(HubEvent::Error(HubError::Queue(error.clone())));
        }

        let outcome = match self.ports.get_mut(&port) {
            Some(p) => p.resolve_query(query, error.is_none(), &self.config.port_setup),
            // Port detached while the query was in flight.
            None => return,
        };

        for follow_up in outcome.follow_ups {
            self.issue_query(port, follow_up);
        }

        match outcome.transition {
            Some(PortStatus::Initialized) => {
                self.emit(HubEvent::PortReady { port });
                self.resolve_ready_waiters(port, Ok(()));
            }
            Some(PortStatus::Failure) => {
                self.emit(HubEvent::PortFailed { port });
                self.resolve_ready_waiters(port, Err(HubError::PortFailed(port)));
            }
            _ => {}
        }
    }

    fn resolve_ready_waiters(&mut self, port: u8, result: Result<(), HubError>) {
        if let Some(waiters) = self.ready_waiters.remove(&port) {
            for waiter in waiters {
                let _ = waiter.send(result.clone());
            }
        }
    }

    fn handle_set_input_format(
        &mut self,
        port: u8,
        mode: u8,
        delta: u32,
        notify: bool,
        reply: oneshot::Sender<Result<(), HubError>>,
    ) {
        if !self.ports.contains_key(&port) {
            let _ = reply.send(Err(HubError::UnknownPort(port)));
            return;
        }
        let queue = self.queue.clone();
        tokio::spawn(async move {
            let result = queue
                .request(RequestBody::InputFormatSingle {
                    port,
                    mode,
                    delta,
                    notify,
                })
                .await
                .map(|_| ())
                .map_err(HubError::from);
            let _ = reply.send(result);
        });
    }

    fn prepare_combined(
        &self,
        port: u8,
        entries: &[CombinedEntry],
    ) -> Result<CombinedSubscription, HubError> {
        if entries.len() < 2 {
            return Err(SubscriptionError::TooFewEntries.into());
        }
        let p = self.ports.get(&port).ok_or(HubError::UnknownPort(port))?;
        let info = p
            .information()
            .ok_or(HubError::Subscription(SubscriptionError::NotCombinable))?;
        if !info.capabilities.contains(PortCapabilities::COMBINABLE) {
            return Err(SubscriptionError::NotCombinable.into());
        }

        let modes: Vec<u8> = entries.iter().map(|e| e.mode).collect();
        let combination =
            resolve_combination_index(&modes, info.combinations.as_deref().unwrap_or(&[]));
        Ok(CombinedSubscription {
            combination,
            entries: entries.to_vec(),
        })
    }

    fn handle_subscribe_values(
        &mut self,
        port: u8,
        entries: Vec<CombinedEntry>,
        reply: oneshot::Sender<Result<(), HubError>>,
    ) {
        let subscription = match self.prepare_combined(port, &entries) {
            Ok(subscription) => subscription,
            Err(error) => {
                let _ = reply.send(Err(error));
                return;
            }
        };

        let requests = subscription.setup_requests(port);
        if let Some(p) = self.ports.get_mut(&port) {
            p.stage_combined(subscription);
        }
        let _ = reply.send(Ok(()));

        // Sub-request errors go to the hub-level sink, not the caller.
        let queue = self.queue.clone();
        let cmd_tx = self.cmd_tx.clone();
        tokio::spawn(async move {
            for body in requests {
                if let Err(error) = queue.request(body).await {
                    let _ = cmd_tx.send(HubCommand::SequenceFailed { port, error });
                    break;
                }
            }
        });
    }

    fn handle_setup_virtual_port(
        &mut self,
        first: u8,
        second: u8,
        reply: oneshot::Sender<Result<(), HubError>>,
    ) {
        for port in [first, second] {
            if !self.ports.contains_key(&port) {
                let _ = reply.send(Err(HubError::UnknownPort(port)));
                return;
            }
        }
        let queue = self.queue.clone();
        tokio::spawn(async move {
            let result = queue
                .request(RequestBody::VirtualPortSetup(VirtualPortRequest::Connect {
                    first,
                    second,
                }))
                .await
                .map(|_| ())
                .map_err(HubError::from);
            let _ = reply.send(result);
        });
    }

    fn handle_disconnect_virtual_port(
        &mut self,
        port: u8,
        reply: oneshot::Sender<Result<(), HubError>>,
    ) {
        match self.ports.get(&port) {
            None => {
                let _ = reply.send(Err(HubError::UnknownPort(port)));
            }
            Some(p) if p.virtual_members().is_none() => {
                let _ = reply.send(Err(HubError::NotVirtual(port)));
            }
            Some(_) => {
                let queue = self.queue.clone();
                tokio::spawn(async move {
                    let result = queue
                        .request(RequestBody::VirtualPortSetup(
                            VirtualPortRequest::Disconnect { port },
                        ))
                        .await
                        .map(|_| ())
                        .map_err(HubError::from);
                    let _ = reply.send(result);
                });
            }
        }
    }

    fn handle_startup(&self, reply: oneshot::Sender<()>) {
        let Some(port) = self.config.persistent_virtual_port else {
            let _ = reply.send(());
            return;
        };
        let queue = self.queue.clone();
        tokio::spawn(async move {
            // The firmware keeps this virtual port alive across reconnects
            // without re-announcing it; disconnect it blind and ignore the
            // error a fresh hub returns.
            if let Err(error) = queue
                .request(RequestBody::VirtualPortSetup(
                    VirtualPortRequest::Disconnect { port },
                ))
                .await
            {
                debug!(port, %error, "stale virtual port disconnect ignored");
            }
            let _ = reply.send(());
        });
    }

    fn handle_watch_ready(&mut self, port: u8, notify: oneshot::Sender<Result<(), HubError>>) {
        match self.ports.get(&port) {
            None => {
                let _ = notify.send(Err(HubError::UnknownPort(port)));
            }
            Some(p) => match p.status() {
                PortStatus::Initialized => {
                    let _ = notify.send(Ok(()));
                }
                PortStatus::Failure => {
                    let _ = notify.send(Err(HubError::PortFailed(port)));
                }
                PortStatus::Initializing => {
                    self.ready_waiters.entry(port).or_default().push(notify);
                }
            },
        }
    }
}

fn decode_text(payload: &Bytes) -> String {
    let end = payload.iter().position(|b| *b == 0).unwrap_or(payload.len());
    String::from_utf8_lossy(&payload[..end]).into_owned()
}

fn parse_property(property: PropertyKind, payload: &Bytes) -> PropertyValue {
    match property {
        PropertyKind::AdvertisingName | PropertyKind::ManufacturerName => {
            PropertyValue::Text(decode_text(payload))
        }
        PropertyKind::Button => PropertyValue::Bool(payload.first().is_some_and(|b| *b != 0)),
        PropertyKind::FirmwareVersion | PropertyKind::HardwareVersion => match payload.get(..4) {
            Some(bytes) => PropertyValue::Version(Version::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            None => PropertyValue::Raw(payload.clone()),
        },
        PropertyKind::Rssi => payload
            .first()
            .map_or(PropertyValue::Raw(payload.clone()), |b| {
                PropertyValue::Rssi(*b as i8)
            }),
        PropertyKind::BatteryVoltage => payload
            .first()
            .map_or(PropertyValue::Raw(payload.clone()), |b| {
                PropertyValue::Percentage(*b)
            }),
        _ => PropertyValue::Raw(payload.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_property() {
        let payload = Bytes::from_static(b"Move Hub\0\0");
        assert_eq!(
            parse_property(PropertyKind::AdvertisingName, &payload),
            PropertyValue::Text("Move Hub".to_owned())
        );
    }

    #[test]
    fn test_parse_numeric_properties() {
        assert_eq!(
            parse_property(PropertyKind::Rssi, &Bytes::from_static(&[0xC4])),
            PropertyValue::Rssi(-60)
        );
        assert_eq!(
            parse_property(PropertyKind::BatteryVoltage, &Bytes::from_static(&[87])),
            PropertyValue::Percentage(87)
        );
        assert_eq!(
            parse_property(PropertyKind::Button, &Bytes::from_static(&[1])),
            PropertyValue::Bool(true)
        );
    }

    #[test]
    fn test_parse_version_property() {
        let payload = Bytes::from_static(&[0x00, 0x00, 0x03, 0x12]);
        match parse_property(PropertyKind::FirmwareVersion, &payload) {
            PropertyValue::Version(version) => {
                assert_eq!(version.major, 1);
                assert_eq!(version.minor, 2);
                assert_eq!(version.patch, 3);
            }
            other => panic!("unexpected value {other:?}"),
        }
    }

    #[test]
    fn test_unparsed_property_keeps_raw_payload() {
        let payload = Bytes::from_static(&[0xAA, 0xBB]);
        assert_eq!(
            parse_property(PropertyKind::PrimaryMac, &payload),
            PropertyValue::Raw(payload.clone())
        );
    }
}
