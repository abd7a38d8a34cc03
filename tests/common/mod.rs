//! Canned-response HTTP peer for integration tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::mpsc;
use std::thread;

/// Serve `response` to exactly one connection and hand back the request bytes it received.
pub fn serve_once(response: impl Into<Vec<u8>>) -> (SocketAddr, mpsc::Receiver<String>) {
    let response = response.into();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let Ok((socket, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(socket);

        let mut head = String::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            if let Some((name, value)) = line.split_once(':')
                && name.trim().eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap_or(0);
            }
            head.push_str(&line);
            if line == "\r\n" {
                break;
            }
        }
        let mut body = vec![0; content_length];
        let _ = reader.read_exact(&mut body);
        head.push_str(&String::from_utf8_lossy(&body));

        let mut socket = reader.into_inner();
        let _ = socket.write_all(&response);
        let _ = socket.flush();
        let _ = tx.send(head);
    });

    (addr, rx)
}

/// The body section of a formatted report.
pub fn body_section(report: &str) -> &str {
    let start = report.find("=== Response Body ===\n").unwrap() + "=== Response Body ===\n".len();
    let end = report.find("\n\n=== Request Info ===").unwrap();
    &report[start..end]
}
