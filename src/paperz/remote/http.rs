use crate::error::Result;
use crate::remote::Transport;

/// Production transport: blocking reqwest with the server token attached
/// to every request. Timeouts are whatever reqwest enforces by default.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    token: String,
}

impl HttpTransport {
    pub fn new(token: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            client,
            token: token.to_string(),
        })
    }

    fn auth(&self) -> String {
        format!("Token {}", self.token)
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<(u16, String)> {
        let response = self
            .client
            .get(url)
            .header("Authorization", self.auth())
            .send()?;
        let status = response.status().as_u16();
        Ok((status, response.text()?))
    }

    fn get_bytes(&self, url: &str) -> Result<(u16, Vec<u8>)> {
        let response = self
            .client
            .get(url)
            .header("Authorization", self.auth())
            .send()?;
        let status = response.status().as_u16();
        Ok((status, response.bytes()?.to_vec()))
    }

    fn patch(&self, url: &str, body: &serde_json::Value) -> Result<(u16, String)> {
        let response = self
            .client
            .patch(url)
            .header("Authorization", self.auth())
            .json(body)
            .send()?;
        let status = response.status().as_u16();
        Ok((status, response.text()?))
    }
}
