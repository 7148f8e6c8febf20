use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::protocol::{decode_client_frame, ErrorCode, ServerMessage};
use crate::server::GameServer;

use super::sending::send_text_message;

pub(super) async fn handle_socket(socket: WebSocket, server: Arc<GameServer>, addr: SocketAddr) {
    let (mut sender, mut receiver) = socket.split();
    let queue_capacity = server.config().outbound_queue_capacity.max(1);
    let (tx, mut rx) = mpsc::channel::<Arc<ServerMessage>>(queue_capacity);

    let (connection_id, player_id) = server.register_connection(tx.clone());
    tracing::info!(%connection_id, %player_id, client_addr = %addr, "WebSocket connection established");

    // First frame on every connection: the assigned participant identity.
    if tx
        .try_send(Arc::new(ServerMessage::ConnectionAck { player_id }))
        .is_err()
    {
        tracing::warn!(%connection_id, "Failed to queue connection_ack");
        let _ = sender.close().await;
        server.unregister_connection(connection_id).await;
        return;
    }

    // Outbound pump: drain the bounded queue onto the socket.
    let send_server = server.clone();
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if send_text_message(&mut sender, &message, &connection_id)
                .await
                .is_err()
            {
                break;
            }
        }
        send_server.unregister_connection(connection_id).await;
    });

    // Inbound pump: frames from one connection are handled in arrival order.
    let receive_server = server.clone();
    let receive_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(%connection_id, "WebSocket error: {}", e);
                    break;
                }
            };

            match frame {
                Message::Text(text) => {
                    let max_size = receive_server.config().max_message_size;
                    if text.len() > max_size {
                        tracing::warn!(
                            %connection_id,
                            size = text.len(),
                            max = max_size,
                            "Frame exceeds size limit"
                        );
                        receive_server.send_error_message(
                            connection_id,
                            format!(
                                "Message too large ({} bytes, max {} bytes)",
                                text.len(),
                                max_size
                            ),
                            Some(ErrorCode::MessageTooLarge),
                        );
                        continue;
                    }

                    let message = match decode_client_frame(&text) {
                        Ok(message) => message,
                        Err(err) => {
                            tracing::warn!(
                                %connection_id,
                                error = %err,
                                "Rejected client WebSocket frame"
                            );
                            receive_server.send_error_message(
                                connection_id,
                                err.to_string(),
                                Some(err.error_code()),
                            );
                            continue;
                        }
                    };

                    receive_server
                        .handle_client_message(connection_id, message)
                        .await;
                }
                Message::Binary(_) => {
                    receive_server.send_error_message(
                        connection_id,
                        "Binary frames are not supported".to_string(),
                        Some(ErrorCode::InvalidInput),
                    );
                }
                Message::Close(_) => {
                    tracing::info!(%connection_id, "WebSocket connection closed");
                    break;
                }
                // axum answers pings itself; pongs need no bookkeeping here.
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
        receive_server.unregister_connection(connection_id).await;
    });

    tokio::select! {
        _ = send_task => {}
        _ = receive_task => {}
    }

    server.unregister_connection(connection_id).await;
}
