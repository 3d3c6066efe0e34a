//! HTTP transport: POSTs each page request as JSON with a blocking client.

use reqwest::blocking::Client;

use crate::model::{QueryPage, QueryRequest};

use super::{FetchError, Transport};

/// Talks to the real query endpoint.
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Builds a client for the given endpoint URL.
    pub fn new(url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self::with_client(client, url))
    }

    /// Uses an already configured client.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl Transport for HttpTransport {
    fn post_query(&self, request: &QueryRequest) -> Result<QueryPage, FetchError> {
        let page = request.options.page;

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(|source| FetchError::Request { page, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { page, status });
        }

        response
            .json()
            .map_err(|source| FetchError::Decode { page, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use serde_json::Value;

    use crate::model::{LaunchFilter, QueryOptions, SortOrder, SortSpec};

    /// Answers one request with the given status line and body, and hands back
    /// the JSON body it received.
    fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<Value>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v4/launches/query", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':')
                    && name.eq_ignore_ascii_case("content-length")
                {
                    content_length = value.trim().parse().unwrap();
                }
            }
            let mut received = vec![0; content_length];
            reader.read_exact(&mut received).unwrap();

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();

            serde_json::from_slice(&received).unwrap()
        });

        (url, handle)
    }

    /// Local test servers must not be routed through an ambient proxy.
    fn local_transport(url: String) -> HttpTransport {
        HttpTransport::with_client(Client::builder().no_proxy().build().unwrap(), url)
    }

    fn request(page: u32) -> QueryRequest {
        QueryRequest {
            query: LaunchFilter::default(),
            options: QueryOptions {
                page,
                limit: 50,
                sort: SortSpec {
                    flight_number: SortOrder::Asc,
                },
                populate: vec!["payloads".into()],
            },
        }
    }

    #[test]
    fn posts_query_and_decodes_page() {
        let (url, server) = serve_once("200 OK", r#"{"docs":[{"id":"a"}],"hasNextPage":true}"#);
        let transport = local_transport(url);

        let page = transport.post_query(&request(4)).unwrap();

        assert_eq!(page.docs.len(), 1);
        assert!(page.has_next_page);
        let received = server.join().unwrap();
        assert_eq!(received["options"]["page"], 4);
        assert_eq!(received["options"]["sort"]["flight_number"], "asc");
    }

    #[test]
    fn error_status_is_a_fetch_error() {
        let (url, server) = serve_once("503 Service Unavailable", "{}");
        let transport = local_transport(url);

        let err = transport.post_query(&request(2)).unwrap_err();

        assert!(matches!(
            err,
            FetchError::Status { page: 2, status } if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
        server.join().unwrap();
    }

    #[test]
    fn unreachable_endpoint_is_a_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);
        let transport = local_transport(url);

        let err = transport.post_query(&request(1)).unwrap_err();

        assert!(matches!(err, FetchError::Request { page: 1, .. }));
    }
}
