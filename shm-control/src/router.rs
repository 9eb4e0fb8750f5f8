use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;

use crate::transport::options::{ShmTransportOptions, TransportListenIp};
use crate::transport::ShmTransport;
use crate::worker::channel::Channel;
use crate::worker::message::RequestMethod;
use crate::worker::registry::HandleRegistry;
use shared::error::{Error, Result};

/// Owning collaborator for a set of shm transports.
///
/// Creates transports on the worker, registers their local mirrors in the
/// handle registry, and tears all of them down in bulk when closed. The
/// producer/consumer object graph above the transports lives outside this
/// crate and only subscribes to the transports' event surfaces.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    id: String,
    channel: Channel,
    registry: Arc<HandleRegistry>,
    closed: AtomicBool,
    transports: Mutex<Vec<ShmTransport>>,
}

/// Creation payload for `router.createShmTransport`. `app_data` stays local
/// and is deliberately absent here.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateShmTransportData<'a> {
    transport_id: &'a str,
    listen_ip: &'a TransportListenIp,
    shm_name: &'a str,
    log_name: &'a str,
    log_level: u8,
}

impl Router {
    pub fn new(id: &str, channel: Channel, registry: Arc<HandleRegistry>) -> Self {
        Router {
            inner: Arc::new(RouterInner {
                id: id.to_owned(),
                channel,
                registry,
                closed: AtomicBool::new(false),
                transports: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Creates a worker-side shm transport and its local mirror.
    ///
    /// The fresh transport id is registered after the worker accepts the
    /// creation command; a registry collision is fatal to the creation
    /// attempt.
    pub async fn create_shm_transport(
        &self,
        options: ShmTransportOptions,
    ) -> Result<ShmTransport> {
        if self.closed() {
            return Err(Error::ErrInvalidState("closed".to_owned()));
        }

        let transport_id = {
            let mut id = generate_id();
            while self.inner.registry.lookup(&id).is_some() {
                id = generate_id();
            }
            id
        };

        log::debug!(
            "create_shm_transport() [routerId:{}, transportId:{transport_id}]",
            self.inner.id
        );

        let data = serde_json::to_value(CreateShmTransportData {
            transport_id: &transport_id,
            listen_ip: &options.listen_ip,
            shm_name: &options.shm_name,
            log_name: &options.log_name,
            log_level: options.log_level,
        })?;
        self.inner
            .channel
            .request(RequestMethod::RouterCreateShmTransport, &self.inner.id, data)
            .await?;

        let transport = ShmTransport::new(
            transport_id,
            options,
            self.inner.channel.clone(),
            self.inner.registry.clone(),
        );
        self.inner
            .registry
            .register(transport.id(), transport.inner().clone())?;

        let mut transports = self.inner.transports.lock().unwrap();
        transports.push(transport.clone());

        Ok(transport)
    }

    /// Closes the router and every transport it owns.
    ///
    /// One best-effort `router.close` command covers the whole worker-side
    /// subtree; the owned transports are torn down through their bulk path,
    /// which issues no per-transport worker close commands.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        log::debug!("close() [routerId:{}]", self.inner.id);

        self.inner
            .channel
            .request_detached(RequestMethod::RouterClose, &self.inner.id, Value::Null);

        let transports = {
            let mut transports = self.inner.transports.lock().unwrap();
            std::mem::take(&mut *transports)
        };
        for transport in transports {
            transport.router_closed();
        }
    }
}

/// Random stable handle, in the id style the worker expects.
fn generate_id() -> String {
    format!("{:08x}-{:08x}", rand::random::<u32>(), rand::random::<u32>())
}
