//! Tests de integración para el servidor de archivos
//! tests/integration_test.rs
//!
//! Cada test levanta su propio `Server` en un puerto efímero sobre un
//! document root temporal y lo apaga al final.

use file_server::config::Config;
use file_server::server::{Server, ServerReport, ShutdownHandle};
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct TestServer {
    addr: SocketAddr,
    handle: ShutdownHandle,
    runner: JoinHandle<ServerReport>,
    root: PathBuf,
}

impl TestServer {
    fn start(tag: &str, num_threads: usize, queue_capacity: usize) -> Self {
        let root = std::env::temp_dir().join(format!(
            "file_server-it-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("site")).unwrap();
        fs::create_dir_all(root.join("files/nested")).unwrap();
        fs::write(root.join("index.html"), b"<html>home</html>").unwrap();
        fs::write(root.join("site/index.html"), b"<html>site</html>").unwrap();
        fs::write(root.join("site/style.css"), b"body { color: red; }").unwrap();
        fs::write(root.join("files/a.txt"), b"aaa").unwrap();
        fs::write(root.join("files/b.pdf"), b"%PDF-1.4").unwrap();
        fs::write(root.join("files/foo.js"), b"1;").unwrap();
        fs::write(root.join("files/foo.unknownext"), b"?").unwrap();

        let config = Config {
            port: 0,
            files_dir: root.to_string_lossy().into_owned(),
            num_threads,
            queue_capacity,
            ..Config::default()
        };
        let server = Server::bind(config).expect("server should start");
        let addr = server.local_addr().unwrap();
        let handle = server.shutdown_handle().unwrap();
        let runner = thread::spawn(move || server.run());

        Self {
            addr,
            handle,
            runner,
            root,
        }
    }

    fn stop(self) -> ServerReport {
        self.handle.shutdown();
        let report = self.runner.join().expect("server thread panicked");
        fs::remove_dir_all(&self.root).ok();
        report
    }
}

/// Helper: envía bytes crudos y retorna la response completa
fn send_raw(addr: SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    stream.write_all(raw).unwrap();
    stream.flush().unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

fn get(addr: SocketAddr, path: &str) -> String {
    send_raw(addr, format!("GET {} HTTP/1.0\r\n\r\n", path).as_bytes())
}

/// Helper: extrae el body de una response HTTP
fn extract_body(response: &str) -> &str {
    match response.find("\r\n\r\n") {
        Some(pos) => &response[pos + 4..],
        None => "",
    }
}

#[test]
fn test_serves_files_indexes_and_listings() {
    let server = TestServer::start("basic", 4, 16);

    let home = get(server.addr, "/");
    assert!(home.starts_with("HTTP/1.0 200 OK\r\n"), "got: {}", home);
    assert!(home.contains("Content-Type: text/html\r\n"));
    assert_eq!(extract_body(&home), "<html>home</html>");

    let site = get(server.addr, "/site/");
    assert_eq!(extract_body(&site), "<html>site</html>");

    let css = get(server.addr, "/site/style.css");
    assert!(css.contains("Content-Type: text/css\r\n"));
    assert!(css.contains("Content-Length: 20\r\n"));

    let js = get(server.addr, "/files/foo.js");
    assert!(js.contains("Content-Type: application/javascript\r\n"));
    let unknown = get(server.addr, "/files/foo.unknownext");
    assert!(unknown.contains("Content-Type: text/plain\r\n"));

    let listing = get(server.addr, "/files/");
    assert!(listing.starts_with("HTTP/1.0 200 OK\r\n"));
    let body = extract_body(&listing);
    assert!(body.contains("Index of /files/"));
    // Padre + a.txt, b.pdf, foo.js, foo.unknownext, nested/
    assert_eq!(body.matches("<li>").count(), 6);
    assert_eq!(body.matches("Parent Directory").count(), 1);
    assert!(body.contains("<a href=\"nested/\">nested/</a>"));

    let report = server.stop();
    assert_eq!(report.metrics.total_requests, 6);
    assert_eq!(report.pool.completed, 6);
}

#[test]
fn test_error_statuses() {
    let server = TestServer::start("errors", 2, 8);

    let missing = get(server.addr, "/nope.html");
    assert!(missing.starts_with("HTTP/1.0 404 Not Found\r\n"));

    let malformed = send_raw(server.addr, b"GET\r\n");
    assert!(malformed.starts_with("HTTP/1.0 400 Bad Request\r\n"));

    let empty_path = send_raw(server.addr, b"GET  HTTP/1.0\r\n");
    assert!(empty_path.starts_with("HTTP/1.0 400 Bad Request\r\n"));

    let traversal = get(server.addr, "/../../../../etc/passwd");
    assert!(traversal.starts_with("HTTP/1.0 403 Forbidden\r\n"));

    let method = send_raw(server.addr, b"PUT /files/a.txt HTTP/1.0\r\n\r\n");
    assert!(method.starts_with("HTTP/1.0 405 Method Not Allowed\r\n"));

    let report = server.stop();
    let codes = &report.metrics.status_codes;
    assert_eq!(codes.get(&404), Some(&1));
    assert_eq!(codes.get(&400), Some(&2));
    assert_eq!(codes.get(&403), Some(&1));
    assert_eq!(codes.get(&405), Some(&1));
}

#[test]
fn test_truncated_request_line() {
    let server = TestServer::start("truncated", 2, 8);

    // El cliente cierra su lado sin mandar el \n
    let mut stream = TcpStream::connect(server.addr).unwrap();
    stream.write_all(b"GET /files/a.txt HTTP/1.0").unwrap();
    stream.shutdown(std::net::Shutdown::Write).unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();

    assert!(response.starts_with("HTTP/1.0 400 Bad Request\r\n"));
    server.stop();
}

#[test]
fn test_concurrent_clients_all_served() {
    let server = TestServer::start("concurrent", 4, 4);
    let addr = server.addr;

    let clients: Vec<_> = (0..32)
        .map(|i| {
            thread::spawn(move || {
                let path = if i % 2 == 0 { "/files/a.txt" } else { "/files/b.pdf" };
                get(addr, path)
            })
        })
        .collect();

    for client in clients {
        let response = client.join().unwrap();
        assert!(response.starts_with("HTTP/1.0 200 OK\r\n"), "got: {}", response);
    }

    let report = server.stop();
    assert_eq!(report.pool.submitted, 32);
    assert_eq!(report.pool.completed, 32);
    assert_eq!(report.pool.panicked, 0);
    assert_eq!(report.metrics.status_codes.get(&200), Some(&32));
}

#[test]
fn test_head_request() {
    let server = TestServer::start("head", 1, 4);

    let response = send_raw(server.addr, b"HEAD /files/a.txt HTTP/1.0\r\n\r\n");
    assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(response.contains("Content-Length: 3\r\n"));
    assert_eq!(extract_body(&response), "");

    server.stop();
}
