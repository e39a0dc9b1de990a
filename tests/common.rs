#![allow(dead_code)]

use image::{DynamicImage, ImageFormat};
use std::fs;
use std::io::{BufRead, BufReader, Cursor, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
pub const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];

/// A valid 1x1 image in `format`, followed by zero padding up to `size`
/// bytes. Decoders stop at the end of the image, so the padding only moves
/// the file size.
pub fn padded_image(dir: &Path, name: &str, format: ImageFormat, size: usize) -> PathBuf {
    let mut data = Vec::new();
    DynamicImage::new_rgb8(1, 1)
        .write_to(&mut Cursor::new(&mut data), format)
        .unwrap();
    assert!(data.len() <= size, "{:?} fixture needs at least {} bytes", format, data.len());
    data.resize(size, 0);
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

/// Starts with a valid signature, then garbage: recognisable but not an image.
pub fn broken_image(dir: &Path, name: &str, magic: &[u8], size: usize) -> PathBuf {
    let mut data = magic.to_vec();
    data.resize(size, 0x5A);
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

/// A real, decodable JPEG written at maximum quality.
pub fn real_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        let v = ((x * 13 + y * 7) ^ (x * y)) as u8;
        image::Rgb([v, v.wrapping_add(40), v.wrapping_mul(5)])
    });
    let path = dir.join(name);
    let file = fs::File::create(&path).unwrap();
    let mut writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, 100)
        .encode_image(&img)
        .unwrap();
    writer.flush().unwrap();
    path
}

/// A real, decodable PNG.
pub fn real_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7) as u8, (y * 11) as u8, ((x + y) * 3) as u8])
    });
    let path = dir.join(name);
    img.save_with_format(&path, ImageFormat::Png).unwrap();
    path
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub enum Reply {
    Respond {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    },
    /// Accept the request and never answer.
    Hang,
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Reply::Respond {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn created(location: String) -> Self {
        Reply::Respond {
            status: 201,
            headers: vec![("Location".to_string(), location)],
            body: Vec::new(),
        }
    }

    pub fn body(bytes: Vec<u8>) -> Self {
        Reply::Respond {
            status: 200,
            headers: vec![("Content-Type".to_string(), "image/png".to_string())],
            body: bytes,
        }
    }
}

type Handler = dyn Fn(&RecordedRequest, usize, SocketAddr) -> Reply + Send + Sync;

/// Minimal HTTP/1.1 server standing in for the shrink service. The handler
/// receives each request, its zero-based sequence number and the server
/// address.
pub struct StubServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest, usize, SocketAddr) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = requests.clone();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let handler = handler.clone();
                let recorded = recorded.clone();
                thread::spawn(move || serve(stream, addr, handler, recorded));
            }
        });

        Self { addr, requests }
    }

    /// The standard TinyPNG exchange: POST /shrink answers 201 with a
    /// Location, GET on that location returns `optimized`.
    pub fn tinypng(optimized: Vec<u8>) -> Self {
        Self::start(move |request, _, addr| match request.method.as_str() {
            "POST" => Reply::created(format!("http://{}/output/result.png", addr)),
            _ => Reply::body(optimized.clone()),
        })
    }

    pub fn shrink_url(&self) -> String {
        format!("http://{}/shrink", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn serve(
    stream: TcpStream,
    addr: SocketAddr,
    handler: Arc<Handler>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let request = match read_request(&mut reader) {
        Some(request) => request,
        None => return,
    };

    let sequence = {
        let mut all = recorded.lock().unwrap();
        all.push(request.clone());
        all.len() - 1
    };

    match handler(&request, sequence, addr) {
        Reply::Hang => {
            thread::sleep(Duration::from_secs(30));
        }
        Reply::Respond {
            status,
            headers,
            body,
        } => {
            let mut stream = stream;
            let mut head = format!("HTTP/1.1 {} Stub\r\n", status);
            for (name, value) in headers {
                head.push_str(&format!("{}: {}\r\n", name, value));
            }
            head.push_str(&format!("Content-Length: {}\r\n", body.len()));
            head.push_str("Connection: close\r\n\r\n");
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
        }
    }
}

fn read_request(reader: &mut BufReader<TcpStream>) -> Option<RecordedRequest> {
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = Vec::new();
    loop {
        line.clear();
        reader.read_line(&mut line).ok()?;
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).ok()?;

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}
