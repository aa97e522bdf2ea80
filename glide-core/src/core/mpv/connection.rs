use crate::core::events::EnginePayload;
use crate::core::mpv::{MpvError, MpvMessage, MpvReply, MpvRequest, Result};
use fx_callback::{Callback, MultiThreadedCallback, Subscription};
use interprocess::local_socket::tokio::prelude::LocalSocketStream;
use interprocess::local_socket::traits::tokio::Stream;
use interprocess::local_socket::{GenericFilePath, ToFsName};
use log::{debug, error, trace, warn};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{split, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{oneshot, Mutex};
use tokio::{select, time};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A connection with the JSON IPC server of an mpv instance.
///
/// Replies are matched with their requests through the `request_id`,
/// events are delivered to the subscribers in the order mpv wrote them.
#[derive(Debug, Clone)]
pub struct MpvConnection {
    inner: Arc<InnerMpvConnection>,
}

impl MpvConnection {
    /// Create a new connection over the given stream.
    ///
    /// # Arguments
    ///
    /// * `stream` - The duplex stream towards the mpv IPC server.
    /// * `timeout` - The maximum time to wait for the reply of a command.
    pub fn new<S>(stream: S, timeout: Duration) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = split(stream);
        let inner = Arc::new(InnerMpvConnection {
            request_id: AtomicU64::new(1),
            writer: Mutex::new(Box::new(writer)),
            pending_requests: Default::default(),
            callbacks: MultiThreadedCallback::new(),
            timeout,
            cancellation_token: Default::default(),
        });

        let inner_reader = inner.clone();
        tokio::spawn(async move {
            inner_reader.start(reader).await;
        });

        Self { inner }
    }

    /// Connect to the mpv IPC server at the given socket or pipe path.
    pub async fn connect(path: &str, timeout: Duration) -> Result<Self> {
        let name = path
            .to_fs_name::<GenericFilePath>()
            .map_err(|e| MpvError::Connection(path.to_string(), e.to_string()))?;
        let stream = LocalSocketStream::connect(name)
            .await
            .map_err(|e| MpvError::Connection(path.to_string(), e.to_string()))?;

        debug!("Connected to mpv ipc server {}", path);
        Ok(Self::new(stream, timeout))
    }

    /// Connect to the mpv IPC server, retrying until the server socket becomes available.
    /// mpv creates the socket only after it has been started, which might take a while.
    pub async fn connect_with_retry(
        path: &str,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        let started = Instant::now();

        loop {
            match Self::connect(path, timeout).await {
                Ok(connection) => return Ok(connection),
                Err(e) if started.elapsed() < connect_timeout => {
                    trace!("Mpv ipc server {} not yet available, {}", path, e);
                    time::sleep(CONNECT_RETRY_INTERVAL).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Execute the given command on mpv.
    ///
    /// # Returns
    ///
    /// It returns the data of the mpv reply, or [MpvError::Command] when mpv rejected the command.
    pub async fn command(&self, command: Vec<Value>) -> Result<Option<Value>> {
        self.inner.command(command).await
    }

    /// Observe the given properties, the property ids start at 1.
    pub async fn observe_properties<S: AsRef<str>>(&self, properties: &[S]) -> Result<()> {
        for (index, property) in properties.iter().enumerate() {
            let property = property.as_ref();
            self.command(vec![
                json!("observe_property"),
                json!(index + 1),
                json!(property),
            ])
            .await?;
            debug!("Observing mpv property {}", property);
        }

        Ok(())
    }

    /// Check if the connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.cancellation_token.is_cancelled()
    }

    /// Close the connection with mpv.
    pub fn close(&self) {
        trace!("Mpv connection is being closed by client");
        self.inner.cancellation_token.cancel();
    }

    /// Get a future which resolves when the connection is closed.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.inner.cancellation_token.cancelled()
    }
}

impl Callback<EnginePayload> for MpvConnection {
    fn subscribe(&self) -> Subscription<EnginePayload> {
        self.inner.callbacks.subscribe()
    }
}

struct InnerMpvConnection {
    request_id: AtomicU64,
    writer: Mutex<BoxedWriter>,
    pending_requests: Mutex<HashMap<u64, oneshot::Sender<MpvReply>>>,
    callbacks: MultiThreadedCallback<EnginePayload>,
    timeout: Duration,
    cancellation_token: CancellationToken,
}

impl InnerMpvConnection {
    async fn start<R: AsyncRead + Unpin>(&self, reader: R) {
        let mut lines = BufReader::new(reader).lines();

        loop {
            select! {
                _ = self.cancellation_token.cancelled() => break,
                line = lines.next_line() => match line {
                    Ok(Some(line)) => self.handle_line(line.as_str()).await,
                    Ok(None) => {
                        trace!("Mpv connection reader received EOF");
                        break;
                    }
                    Err(e) => {
                        error!("Mpv connection reader encountered an error, {}", e);
                        break;
                    }
                },
            }
        }

        self.cancellation_token.cancel();
        self.pending_requests.lock().await.clear();
        debug!("Mpv connection reader main loop ended");
    }

    async fn handle_line(&self, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        match MpvMessage::from_str(line) {
            Ok(MpvMessage::Reply(reply)) => self.handle_reply(reply).await,
            Ok(MpvMessage::Event(payload)) => self.publish(payload),
            Err(e) => warn!("Mpv connection dropped message, {}", e),
        }
    }

    async fn handle_reply(&self, reply: MpvReply) {
        match self.pending_requests.lock().await.remove(&reply.request_id) {
            Some(sender) => {
                if sender.send(reply).is_err() {
                    debug!("Mpv reply arrived after the request has been abandoned");
                }
            }
            None => warn!(
                "Mpv connection received reply for unknown request {}",
                reply.request_id
            ),
        }
    }

    fn publish(&self, payload: EnginePayload) {
        trace!("Mpv connection received event {:?}", payload);
        self.callbacks.invoke(payload);
    }

    async fn command(&self, command: Vec<Value>) -> Result<Option<Value>> {
        if self.cancellation_token.is_cancelled() {
            return Err(MpvError::Closed);
        }

        let command_name = command
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let request_id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let line = MpvRequest::new(request_id, command).to_line()?;
        let (sender, receiver) = oneshot::channel();

        self.pending_requests
            .lock()
            .await
            .insert(request_id, sender);

        if let Err(e) = self.write_line(line.as_str()).await {
            self.pending_requests.lock().await.remove(&request_id);
            return Err(e);
        }

        let reply = select! {
            biased;
            reply = receiver => reply.map_err(|_| MpvError::Closed)?,
            _ = self.cancellation_token.cancelled() => {
                self.pending_requests.lock().await.remove(&request_id);
                return Err(MpvError::Closed);
            },
            _ = time::sleep(self.timeout) => {
                self.pending_requests.lock().await.remove(&request_id);
                return Err(MpvError::Timeout(request_id, self.timeout.as_millis()));
            },
        };

        if reply.is_success() {
            debug!("Mpv command {} ({}) succeeded", command_name, request_id);
            Ok(reply.data)
        } else {
            Err(MpvError::Command(command_name, reply.error))
        }
    }

    async fn write_line(&self, line: &str) -> Result<()> {
        trace!("Mpv connection is writing {}", line.trim_end());
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }
}

impl Debug for InnerMpvConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InnerMpvConnection")
            .field("request_id", &self.request_id)
            .field("timeout", &self.timeout)
            .field("cancellation_token", &self.cancellation_token)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::events::EventProjector;
    use crate::core::state::{PlayerState, PlayerStateEvent, PlayerStateStore};
    use crate::{init_logger, recv_timeout};
    use tokio::io::{duplex, DuplexStream, Lines, ReadHalf, WriteHalf};

    /// A fake mpv IPC server side of a duplex stream.
    pub(crate) struct FakeMpv {
        lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
        writer: WriteHalf<DuplexStream>,
    }

    impl FakeMpv {
        /// Receive the next request written by the connection.
        pub(crate) async fn request(&mut self) -> Value {
            let line = self
                .lines
                .next_line()
                .await
                .unwrap()
                .expect("expected a request line");
            serde_json::from_str(line.as_str()).unwrap()
        }

        pub(crate) async fn write(&mut self, value: Value) {
            let mut line = value.to_string();
            line.push('\n');
            self.writer.write_all(line.as_bytes()).await.unwrap();
        }

        pub(crate) async fn write_raw(&mut self, line: &str) {
            self.writer.write_all(line.as_bytes()).await.unwrap();
        }

        /// Reply with success to the next request and return the request command.
        pub(crate) async fn reply_success(&mut self) -> Value {
            let request = self.request().await;
            self.write(json!({
                "request_id": request["request_id"],
                "error": "success",
                "data": null,
            }))
            .await;
            request["command"].clone()
        }
    }

    pub(crate) fn new_connection(timeout: Duration) -> (MpvConnection, FakeMpv) {
        let (client, server) = duplex(4096);
        let (reader, writer) = split(server);
        let connection = MpvConnection::new(client, timeout);

        (
            connection,
            FakeMpv {
                lines: BufReader::new(reader).lines(),
                writer,
            },
        )
    }

    #[tokio::test]
    async fn test_command() {
        init_logger!();
        let (connection, mut mpv) = new_connection(Duration::from_millis(500));

        let (result, request) = tokio::join!(
            connection.command(vec![json!("get_property"), json!("volume")]),
            async {
                let request = mpv.request().await;
                mpv.write(json!({
                    "request_id": request["request_id"],
                    "error": "success",
                    "data": 80.0,
                }))
                .await;
                request
            }
        );

        assert_eq!(Ok(Some(json!(80.0))), result);
        assert_eq!(json!(["get_property", "volume"]), request["command"]);
        assert_eq!(json!(1), request["request_id"]);
    }

    #[tokio::test]
    async fn test_command_rejected() {
        init_logger!();
        let (connection, mut mpv) = new_connection(Duration::from_millis(500));

        let (result, _) = tokio::join!(
            connection.command(vec![json!("get_property"), json!("foo")]),
            async {
                let request = mpv.request().await;
                mpv.write(json!({
                    "request_id": request["request_id"],
                    "error": "property not found",
                }))
                .await;
            }
        );

        assert_eq!(
            Err(MpvError::Command(
                "get_property".to_string(),
                "property not found".to_string()
            )),
            result
        );
    }

    #[tokio::test]
    async fn test_command_timeout() {
        init_logger!();
        let (connection, mut mpv) = new_connection(Duration::from_millis(100));

        let (result, _) = tokio::join!(connection.command(vec![json!("stop")]), mpv.request());

        assert_eq!(Err(MpvError::Timeout(1, 100)), result);
    }

    #[tokio::test]
    async fn test_command_closed() {
        init_logger!();
        let (connection, _mpv) = new_connection(Duration::from_millis(100));

        connection.close();
        let result = connection.command(vec![json!("stop")]).await;

        assert_eq!(Err(MpvError::Closed), result);
    }

    #[tokio::test]
    async fn test_command_closed_while_pending() {
        init_logger!();
        let (connection, mut mpv) = new_connection(Duration::from_secs(5));

        let (result, _) = tokio::join!(connection.command(vec![json!("stop")]), async {
            mpv.request().await;
            connection.close();
        });

        assert_eq!(Err(MpvError::Closed), result);
    }

    #[tokio::test]
    async fn test_observe_properties() {
        init_logger!();
        let (connection, mut mpv) = new_connection(Duration::from_millis(500));

        let (result, commands) = tokio::join!(
            connection.observe_properties(&["pause", "time-pos"]),
            async {
                let first = mpv.reply_success().await;
                let second = mpv.reply_success().await;
                vec![first, second]
            }
        );

        assert_eq!(Ok(()), result);
        assert_eq!(
            vec![
                json!(["observe_property", 1, "pause"]),
                json!(["observe_property", 2, "time-pos"]),
            ],
            commands
        );
    }

    #[tokio::test]
    async fn test_subscribe_events_in_order() {
        init_logger!();
        let (connection, mut mpv) = new_connection(Duration::from_millis(500));
        let mut receiver = connection.subscribe();

        mpv.write(json!({"event": "property-change", "id": 6, "name": "duration", "data": 120.0}))
            .await;
        mpv.write_raw("this is not json\n").await;
        mpv.write(json!({"event": "property-change", "id": 5, "name": "time-pos", "data": 45.0}))
            .await;
        mpv.write(json!({"event": "property-change", "id": 4, "name": "eof-reached", "data": true}))
            .await;

        let result = recv_timeout!(&mut receiver, Duration::from_millis(200));
        assert_eq!(
            EnginePayload::property_change("duration", Some(json!(120.0))),
            *result
        );
        let result = recv_timeout!(&mut receiver, Duration::from_millis(200));
        assert_eq!(
            EnginePayload::property_change("time-pos", Some(json!(45.0))),
            *result
        );
        let result = recv_timeout!(&mut receiver, Duration::from_millis(200));
        assert_eq!(EnginePayload::eof_reached(), *result);
    }

    #[tokio::test]
    async fn test_events_projected_into_store() {
        init_logger!();
        let (connection, mut mpv) = new_connection(Duration::from_millis(500));
        let store = PlayerStateStore::new();
        let mut receiver = store.subscribe();
        let projector = EventProjector::new(store.clone());
        projector
            .start(connection.subscribe())
            .expect("expected the projector to start");

        for (name, data) in [
            ("pause", json!(false)),
            ("filename", json!("/home/user/Videos/movie.mkv")),
            ("duration", json!(120.0)),
            ("time-pos", json!(45.0)),
            ("eof-reached", json!(true)),
        ] {
            mpv.write(json!({"event": "property-change", "name": name, "data": data}))
                .await;
        }
        for _ in 0..5 {
            let event = recv_timeout!(&mut receiver, Duration::from_millis(250));
            assert!(
                matches!(&*event, PlayerStateEvent::Changed(_)),
                "expected PlayerStateEvent::Changed, got {:?} instead",
                event
            );
        }

        let result = store.get().await;
        assert_eq!(
            PlayerState {
                is_playing: false,
                current_time: 120.0,
                duration: 120.0,
                filename: "movie.mkv".to_string(),
                volume: 100.0,
            },
            result
        );
    }

    #[tokio::test]
    async fn test_closed_on_eof() {
        init_logger!();
        let (connection, mpv) = new_connection(Duration::from_millis(500));

        drop(mpv);
        select! {
            _ = time::sleep(Duration::from_millis(200)) => {
                panic!("expected the connection to have been closed")
            },
            _ = connection.closed() => {},
        }

        assert_eq!(true, connection.is_closed());
    }
}
