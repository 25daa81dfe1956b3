use std::fmt;
use std::io::{BufReader, Read};
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use log::debug;

use crate::core::error::{CaptureError, CaptureResult};
use crate::recorder::StreamSource;

const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    pub fn basic_header(&self) -> String {
        let token = general_purpose::STANDARD.encode(format!("{}:{}", self.login, self.password));
        format!("Basic {}", token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// MJPEG (or any) HTTP stream behind Basic auth. One `open` = one session.
pub struct HttpSource {
    url: String,
    credentials: Credentials,
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new(
        url: impl Into<String>,
        credentials: Credentials,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .build();

        Self {
            url: url.into(),
            credentials,
            agent,
        }
    }

}

impl StreamSource for HttpSource {
    fn open(&mut self) -> CaptureResult<Box<dyn Read + Send>> {
        debug!("[http_in] GET {}", self.url);

        let response = self
            .agent
            .get(&self.url)
            .set("Authorization", &self.credentials.basic_header())
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(status, response) => CaptureError::Status {
                    url: self.url.clone(),
                    status,
                    status_text: response.status_text().to_string(),
                },
                ureq::Error::Transport(t) => CaptureError::connect(self.url.clone(), t),
            })?;

        // ureq follows redirects; anything that is still not 2xx has no body we want
        if !(200..300).contains(&response.status()) {
            return Err(CaptureError::Status {
                url: self.url.clone(),
                status: response.status(),
                status_text: response.status_text().to_string(),
            });
        }

        debug!(
            "[http_in] connected, content-type={}",
            response.header("Content-Type").unwrap_or("-")
        );

        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, response.into_reader())))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_header_encoding() {
        let creds = Credentials::new("Aladdin", "open sesame");
        assert_eq!(creds.basic_header(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn password_is_redacted_in_debug() {
        let creds = Credentials::new("admin", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn refused_connection_is_a_connect_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut source = HttpSource::new(
            format!("http://127.0.0.1:{}/video.mjpg", port),
            Credentials::new("a", "b"),
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        let err = source.open().err().expect("connection must fail");
        assert!(matches!(err, CaptureError::Connect { .. }));
        assert!(err.is_network());
    }
}
