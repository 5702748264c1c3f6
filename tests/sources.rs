//! Byte-source behavior: the file-backed source and the `RandomRead`
//! contract the archive relies on.

mod common;

use common::ZipBuilder;
use razip::{FileSource, HttpSource, RandomRead, ZipArchive};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

#[test]
fn file_source_serves_a_real_archive() {
    let data = ZipBuilder::new()
        .stored("greeting.txt", b"hello from disk")
        .deflated("lorem.txt", &vec![b'l'; 5000])
        .build();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let source = FileSource::open(file.path()).unwrap();
    assert_eq!(source.len(), data.len() as u64);

    let archive = ZipArchive::open(source).unwrap();
    let entry = archive.entry("greeting.txt").unwrap().unwrap();
    let mut reader = archive.reader(entry).unwrap().unwrap();

    let mut text = String::new();
    reader.read_to_string(&mut text).unwrap();
    assert_eq!(text, "hello from disk");
}

#[test]
fn file_source_random_access_is_positionless() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"0123456789").unwrap();
    file.flush().unwrap();

    let mut source = FileSource::open(file.path()).unwrap();

    // Out-of-order reads must not depend on a previous read's position.
    let mut buf = [0u8; 3];
    source.read_exact_at(7, &mut buf).unwrap();
    assert_eq!(&buf, b"789");
    source.read_exact_at(0, &mut buf).unwrap();
    assert_eq!(&buf, b"012");

    let mut short = [0u8; 4];
    let err = source.read_exact_at(8, &mut short).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
}

#[test]
fn http_source_gives_up_on_empty_range_responses() {
    // A server that advertises Range support but answers every ranged GET
    // with a zero-byte 206. The source must exhaust its retry budget and
    // fail instead of re-requesting forever.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        request.extend_from_slice(&buf[..n]);
                        if request.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                }
            }
            let response = if request.starts_with(b"HEAD") {
                "HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nAccept-Ranges: bytes\r\nConnection: close\r\n\r\n"
            } else {
                "HTTP/1.1 206 Partial Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            };
            let _ = stream.write_all(response.as_bytes());
        }
    });

    let mut source = HttpSource::open(format!("http://127.0.0.1:{port}/archive.zip")).unwrap();
    assert_eq!(source.len(), 1000);

    let mut buf = [0u8; 100];
    let err = source.read_exact_at(0, &mut buf).unwrap_err();
    assert!(err.to_string().contains("max retries"), "{err}");
}
