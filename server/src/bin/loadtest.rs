//! Load test for the pong server.
//!
//! Spawns multiple fake WebSocket clients that:
//! - Connect to the server and wait for their id
//! - Join one of several rooms
//! - Periodically send paddleMove messages
//! - Receive and count gameState broadcasts
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]
//!
//! Options:
//!   --clients N      Number of clients to spawn (default: 100)
//!   --rooms N        Number of rooms to spread clients over (default: 50)
//!   --duration S     Test duration in seconds (default: 30)
//!   --move-rate R    Paddle moves per second per client (default: 10)
//!   --url URL        Server URL (default: ws://127.0.0.1:3001/ws)

use futures_util::{SinkExt, StreamExt};
use pong_shared::protocol::{ClientMsg, ServerMsg};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Server broadcast rate the delivery figures are compared against
const EXPECTED_STATE_HZ: f64 = 60.0;

// === Metrics ===

#[derive(Default)]
struct Metrics {
    connected: AtomicU64,
    messages_received: AtomicU64,
    game_states_received: AtomicU64,
    rejections_received: AtomicU64,
    paddle_moves_sent: AtomicU64,
    errors: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

struct ClientPlan {
    client_id: u32,
    url: String,
    room_id: String,
    move_rate: f64,
    duration: Duration,
}

// === Client task ===

async fn run_client(plan: ClientPlan, metrics: Arc<Metrics>) {
    let verbose = plan.client_id < 3;
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&plan.url).await {
        Ok(conn) => conn,
        Err(e) => {
            if plan.client_id < 5 {
                eprintln!("Client {} failed to connect: {}", plan.client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    metrics
        .latency_sum_ms
        .fetch_add(connect_start.elapsed().as_millis() as u64, Ordering::Relaxed);
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    // Wait for yourId before joining
    let my_id = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                if let Ok(ServerMsg::YourId(your_id)) = serde_json::from_str::<ServerMsg>(&text) {
                    return Some(your_id.id);
                }
            }
        }
        None
    })
    .await;

    let my_id = match my_id {
        Ok(Some(id)) => id,
        _ => {
            if verbose {
                eprintln!("Client {} never received an id", plan.client_id);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            metrics.connected.fetch_sub(1, Ordering::Relaxed);
            return;
        }
    };

    if verbose {
        eprintln!("Client {} is {} in {}", plan.client_id, my_id, plan.room_id);
    }

    let join = ClientMsg::JoinGame {
        room_id: plan.room_id.clone(),
    };
    let sent = match serde_json::to_string(&join) {
        Ok(json) => ws.send(Message::Text(json.into())).await.is_ok(),
        Err(_) => false,
    };
    if !sent {
        metrics.errors.fetch_add(1, Ordering::Relaxed);
        metrics.connected.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    let move_interval = if plan.move_rate > 0.0 {
        Duration::from_secs_f64(1.0 / plan.move_rate)
    } else {
        Duration::from_secs(3600) // Effectively never
    };
    let mut move_timer = tokio::time::interval(move_interval);
    move_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let test_end = tokio::time::Instant::now() + plan.duration;
    let mut paddle_y: f64 = 150.0;
    let mut step: f64 = 10.0;

    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(test_end) => break,

            _ = move_timer.tick() => {
                // Sweep the paddle up and down like a held arrow key
                if !(0.0..=340.0).contains(&(paddle_y + step)) {
                    step = -step;
                }
                paddle_y += step;

                let msg = ClientMsg::PaddleMove {
                    room_id: plan.room_id.clone(),
                    paddle_y,
                };
                let Ok(json) = serde_json::to_string(&msg) else {
                    continue;
                };
                if ws.send(Message::Text(json.into())).await.is_ok() {
                    metrics.paddle_moves_sent.fetch_add(1, Ordering::Relaxed);
                } else {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        match serde_json::from_str::<ServerMsg>(&text) {
                            Ok(ServerMsg::GameState(_)) => {
                                metrics.game_states_received.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::Rejected(_)) => {
                                metrics.rejections_received.fetch_add(1, Ordering::Relaxed);
                            }
                            _ => {}
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if verbose {
                            eprintln!("Client {} got Close: {:?}", plan.client_id, frame);
                        }
                        break;
                    }
                    None => break,
                    Some(Err(e)) => {
                        if verbose {
                            eprintln!("Client {} error: {}", plan.client_id, e);
                        }
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut num_clients: u32 = 100;
    let mut num_rooms: u32 = 50;
    let mut duration_secs: u64 = 30;
    let mut move_rate: f64 = 10.0;
    let mut url = "ws://127.0.0.1:3001/ws".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" => {
                i += 1;
                num_clients = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(100);
            }
            "--rooms" => {
                i += 1;
                num_rooms = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(50);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            "--move-rate" => {
                i += 1;
                move_rate = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(10.0);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            other => eprintln!("Ignoring unknown argument {}", other),
        }
        i += 1;
    }
    let num_rooms = num_rooms.max(1);

    println!("=== Pong Server Load Test ===");
    println!("Clients: {}", num_clients);
    println!("Rooms: {}", num_rooms);
    println!("Duration: {}s", duration_secs);
    println!("Move rate: {}/s per client", move_rate);
    println!("URL: {}", url);
    println!();

    let metrics = Arc::new(Metrics::default());
    let duration = Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(num_clients as usize);
    let spawn_start = Instant::now();

    for client_id in 0..num_clients {
        let plan = ClientPlan {
            client_id,
            url: url.clone(),
            room_id: format!("room{}", client_id % num_rooms),
            move_rate,
            duration,
        };
        let metrics = Arc::clone(&metrics);
        handles.push(tokio::spawn(run_client(plan, metrics)));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    println!("All clients spawned in {:?}", spawn_start.elapsed());
    println!();

    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();

        loop {
            interval.tick().await;
            let elapsed = start.elapsed().as_secs();
            println!(
                "[{:3}s] connected={}, msgs={}, game_states={}, rejected={}, moves={}, errors={}",
                elapsed,
                metrics_clone.connected.load(Ordering::Relaxed),
                metrics_clone.messages_received.load(Ordering::Relaxed),
                metrics_clone.game_states_received.load(Ordering::Relaxed),
                metrics_clone.rejections_received.load(Ordering::Relaxed),
                metrics_clone.paddle_moves_sent.load(Ordering::Relaxed),
                metrics_clone.errors.load(Ordering::Relaxed),
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }
    stats_handle.abort();

    println!();
    println!("=== Final Results ===");
    let msgs = metrics.messages_received.load(Ordering::Relaxed);
    let game_states = metrics.game_states_received.load(Ordering::Relaxed);
    let rejections = metrics.rejections_received.load(Ordering::Relaxed);
    let moves = metrics.paddle_moves_sent.load(Ordering::Relaxed);
    let errors = metrics.errors.load(Ordering::Relaxed);
    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);

    println!("Total messages received: {}", msgs);
    println!("Total gameState messages: {}", game_states);
    println!("Total rejections: {}", rejections);
    println!("Total paddleMove sent: {}", moves);
    println!("Total errors: {}", errors);
    if latency_count > 0 {
        println!("Average connect latency: {}ms", latency_sum / latency_count);
    }

    let duration_f = duration_secs.max(1) as f64;
    let states_per_client = game_states as f64 / num_clients.max(1) as f64;
    let expected_per_client = duration_f * EXPECTED_STATE_HZ;

    println!();
    println!("Messages/sec (total): {:.0}", msgs as f64 / duration_f);
    println!("Game states per client: {:.1}", states_per_client);
    println!("Expected game states per client: {:.1}", expected_per_client);
    println!(
        "Delivery rate: {:.1}%",
        states_per_client / expected_per_client * 100.0
    );
}
