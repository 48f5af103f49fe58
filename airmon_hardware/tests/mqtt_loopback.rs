//! `MqttClient` against a minimal loopback broker that only speaks CONNACK.

use std::io::Read;
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use airmon_hardware::net::MqttClient;
use airmon_traits::MessageBroker;

// CONNACK, remaining length 2, no session present, accepted.
const CONNACK: [u8; 4] = [0x20, 0x02, 0x00, 0x00];

fn accept_and_ack(listener: &TcpListener) -> TcpStream {
    let (mut stream, _) = listener.accept().unwrap();
    let mut buf = [0u8; 256];
    let n = stream.read(&mut buf).unwrap();
    assert!(n > 0 && buf[0] == 0x10, "expected CONNECT");
    stream.write_all(&CONNACK).unwrap();
    stream
}

/// Broker that acks the session, then closes it after `hold`.
fn broker_closing_after(hold: Duration) -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let stream = accept_and_ack(&listener);
        thread::sleep(hold);
        drop(stream);
    });
    (port, handle)
}

/// Broker that acks the session and keeps reading until the client leaves.
fn broker_staying_up() -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let mut stream = accept_and_ack(&listener);
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let mut buf = [0u8; 256];
        while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
    });
    (port, handle)
}

#[test]
fn dropped_session_reads_disconnected_and_publish_fails() {
    let (port, broker) = broker_closing_after(Duration::from_millis(200));
    let mut client = MqttClient::new("127.0.0.1", port, Duration::from_secs(2));
    client.connect("airmon-test").unwrap();
    assert!(client.is_connected());

    thread::sleep(Duration::from_millis(500));
    assert!(!client.is_connected());
    assert!(client.publish("airmon/airquality", b"{}").is_err());

    broker.join().unwrap();
}

#[test]
fn open_session_stays_connected_and_publishes() {
    let (port, broker) = broker_staying_up();
    let mut client = MqttClient::new("127.0.0.1", port, Duration::from_secs(2))
        .with_keep_alive(Duration::from_secs(45));
    client.connect("airmon-test").unwrap();

    thread::sleep(Duration::from_millis(100));
    assert!(client.is_connected());
    client.publish("airmon/airquality", b"{\"airValue\":149}").unwrap();

    drop(client);
    broker.join().unwrap();
}
