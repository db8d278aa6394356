//! Integration tests for the WebSocket transport.
//!
//! These tests spin up a real WebSocket server and client to verify
//! that data actually flows over the network correctly. We use
//! `tokio::test` because these tests are async — they need the Tokio
//! runtime to drive the futures (accept, connect, send, recv).

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use parlor_transport::WebSocketListener;
    use tokio_tungstenite::tungstenite::Message;

    /// Helper: connects a tokio-tungstenite client to the given address.
    async fn connect_client(
        addr: &str,
    ) -> tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    > {
        let url = format!("ws://{addr}");
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_accept_send_receive() {
        // "127.0.0.1:0" tells the OS to pick an available port;
        // `local_addr()` reports which one it chose.
        let mut listener = WebSocketListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener
            .local_addr()
            .expect("should have local addr")
            .to_string();

        let server_handle = tokio::spawn(async move {
            listener.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let conn = server_handle.await.expect("task should complete");
        assert!(conn.id().into_inner() > 0);

        let (mut tx, mut rx) = conn.split();

        // Client → server.
        client_ws
            .send(Message::Binary(b"hello".to_vec().into()))
            .await
            .expect("client send");
        let received = rx.recv().await.expect("recv ok");
        assert_eq!(received, Some(b"hello".to_vec()));

        // Server → client.
        tx.send(b"world").await.expect("server send");
        let msg = client_ws.next().await.unwrap().expect("client recv");
        assert_eq!(msg.into_data().as_ref(), b"world");
    }

    #[tokio::test]
    async fn test_text_frames_arrive_as_bytes() {
        // Browser clients send text frames; the receiver normalizes
        // them to bytes so the codec doesn't care.
        let mut listener = WebSocketListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("local addr").to_string();

        let server_handle = tokio::spawn(async move {
            listener.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let conn = server_handle.await.expect("task should complete");
        let (_tx, mut rx) = conn.split();

        client_ws
            .send(Message::Text("{\"type\":\"resign\"}".into()))
            .await
            .expect("client send");

        let received = rx.recv().await.expect("recv ok");
        assert_eq!(received, Some(b"{\"type\":\"resign\"}".to_vec()));
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_close() {
        let mut listener = WebSocketListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("local addr").to_string();

        let server_handle = tokio::spawn(async move {
            listener.accept().await.expect("should accept")
        });

        let mut client_ws = connect_client(&addr).await;
        let conn = server_handle.await.expect("task should complete");
        let (_tx, mut rx) = conn.split();

        client_ws.close(None).await.expect("client close");

        let received = rx.recv().await.expect("recv ok");
        assert_eq!(received, None);
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let mut listener = WebSocketListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("local addr").to_string();

        let server_handle = tokio::spawn(async move {
            let a = listener.accept().await.expect("accept a");
            let b = listener.accept().await.expect("accept b");
            (a, b)
        });

        let _client_a = connect_client(&addr).await;
        let _client_b = connect_client(&addr).await;

        let (a, b) = server_handle.await.expect("task should complete");
        assert_ne!(a.id(), b.id());
    }
}
