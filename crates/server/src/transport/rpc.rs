//! tarpc transport.
//!
//! Every accepted TCP connection carries a single tarpc channel framed as
//! length-delimited JSON. Requests on a channel run concurrently.

use crate::handler::Handler;
use crate::protocol::ClusterService;
use futures::StreamExt;
use geocluster::ClusterEngine;
use std::future::Future;
use std::sync::Arc;
use tarpc::server::{BaseChannel, Channel};
use tarpc::tokio_serde::formats::Json;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tracing::{debug, info, warn};

/// Accept RPC connections until `shutdown` resolves.
///
/// Connections already open keep being served by their own tasks after
/// the accept loop stops.
pub async fn run_server(
    listener: TcpListener,
    engine: Arc<ClusterEngine>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let handler = Handler::new(engine);
    info!("Cluster RPC server listening on {}", listener.local_addr()?);

    tokio::pin!(shutdown);
    loop {
        let (socket, peer) = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(connection) => connection,
                Err(e) => {
                    warn!("Failed to accept RPC connection: {}", e);
                    continue;
                }
            },
        };

        debug!("RPC connection from {}", peer);
        let handler = handler.clone();
        tokio::spawn(async move {
            serve_connection(socket, handler).await;
            debug!("RPC connection from {} closed", peer);
        });
    }

    info!("RPC server stopped");
    Ok(())
}

async fn serve_connection(socket: TcpStream, handler: Handler) {
    let framed = Framed::new(socket, LengthDelimitedCodec::new());
    let transport = tarpc::serde_transport::new(framed, Json::default());

    BaseChannel::with_defaults(transport)
        .execute(handler.serve())
        .for_each(|request| async move {
            tokio::spawn(request);
        })
        .await;
}
