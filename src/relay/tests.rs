use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::time::timeout;

use super::{SessionEnd, connect, is_valid_argument, run_session, validate};
use crate::utils::error::RelayError;

#[test]
fn test_argument_validity() {
    for good in ["alice", "news", "a-b", "x"] {
        assert!(is_valid_argument(good));
    }
    for bad in ["", "a b", "a:b", "a\nb", "\n"] {
        assert!(!is_valid_argument(bad), "{bad:?} should be invalid");
    }
}

#[test]
fn test_validate_reports_name_before_topics() {
    let topics = vec!["ok".to_string(), "not ok".to_string()];
    assert!(matches!(
        validate("bad name", &topics),
        Err(RelayError::InvalidName)
    ));
    assert!(matches!(
        validate("alice", &topics),
        Err(RelayError::InvalidTopic)
    ));
    assert!(validate("alice", &topics[..1]).is_ok());
    assert!(validate("alice", &[]).is_ok());
}

#[tokio::test]
async fn test_connect_failure_is_reported() {
    // grab a free port, then close it again
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = connect(&port.to_string()).await.unwrap_err();
    assert_eq!(err.exit_code(), 3);

    let err = connect("not-a-port").await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_session_announces_and_relays_input() {
    let (broker_side, client_side) = tokio::io::duplex(4096);
    let (from_broker, to_broker) = tokio::io::split(client_side);
    let (broker_read, _broker_write) = tokio::io::split(broker_side);

    let input: &[u8] = b"pub news hello\nunsub news\n";
    let mut output = Vec::new();
    let topics = vec!["news".to_string(), "sport".to_string()];

    let end = timeout(
        Duration::from_secs(2),
        run_session(
            "alice",
            &topics,
            BufReader::new(input),
            &mut output,
            from_broker,
            to_broker,
        ),
    )
    .await
    .expect("session should end when input closes")
    .unwrap();
    assert_eq!(end, SessionEnd::InputClosed);
    assert_eq!(end.exit_code(), 0);

    let mut lines = BufReader::new(broker_read).lines();
    for expected in [
        "name alice",
        "sub news",
        "sub sport",
        "pub news hello",
        "unsub news",
    ] {
        assert_eq!(lines.next_line().await.unwrap().unwrap(), expected);
    }
}

#[tokio::test]
async fn test_session_prints_broker_lines_until_close() {
    let (mut broker_side, client_side) = tokio::io::duplex(4096);
    let (from_broker, to_broker) = tokio::io::split(client_side);

    // input that never ends
    let (_input_writer, input_reader) = tokio::io::duplex(64);
    let mut output = Vec::new();

    let broker = async {
        let mut buf = vec![0u8; "name bob\n".len()];
        broker_side.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, b"name bob\n");
        broker_side
            .write_all(b"alice:news:hi there\n:invalid\n")
            .await
            .unwrap();
        drop(broker_side);
    };

    let (end, ()) = tokio::join!(
        run_session(
            "bob",
            &[],
            BufReader::new(input_reader),
            &mut output,
            from_broker,
            to_broker,
        ),
        broker
    );

    assert_eq!(end.unwrap(), SessionEnd::BrokerClosed);
    assert_eq!(String::from_utf8(output).unwrap(), "alice:news:hi there\n:invalid\n");
}

#[tokio::test]
async fn test_session_forwards_input_bytes_verbatim() {
    let (broker_side, client_side) = tokio::io::duplex(4096);
    let (from_broker, to_broker) = tokio::io::split(client_side);
    let (mut broker_read, _broker_write) = tokio::io::split(broker_side);

    // latin-1 byte, a carriage return and an unterminated last line
    let input: &[u8] = b"pub news caf\xe9\npub news crlf\r\npub news after";
    let mut output = Vec::new();

    let end = timeout(
        Duration::from_secs(2),
        run_session(
            "me",
            &[],
            BufReader::new(input),
            &mut output,
            from_broker,
            to_broker,
        ),
    )
    .await
    .expect("session should end when input closes")
    .unwrap();
    assert_eq!(end, SessionEnd::InputClosed);

    let mut received = Vec::new();
    broker_read.read_to_end(&mut received).await.unwrap();
    assert_eq!(
        received,
        b"name me\npub news caf\xe9\npub news crlf\r\npub news after\n"
    );
}
