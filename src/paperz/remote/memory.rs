use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;
use crate::remote::Transport;

/// Canned-response transport for tests. Unknown URLs answer 404.
///
/// Requests are recorded in call order so tests can assert on sequencing
/// (pagination, per-id fetch order) and on PATCH bodies.
#[derive(Default)]
pub struct InMemoryTransport {
    responses: HashMap<String, (u16, String)>,
    byte_responses: HashMap<String, (u16, Vec<u8>)>,
    patch_responses: HashMap<String, (u16, String)>,
    pub requests: RefCell<Vec<String>>,
    pub patches: RefCell<Vec<(String, serde_json::Value)>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), (status, body.to_string()));
        self
    }

    pub fn with_bytes(mut self, url: &str, status: u16, bytes: Vec<u8>) -> Self {
        self.byte_responses.insert(url.to_string(), (status, bytes));
        self
    }

    pub fn with_patch_response(mut self, url: &str, status: u16, body: &str) -> Self {
        self.patch_responses
            .insert(url.to_string(), (status, body.to_string()));
        self
    }

    pub fn request_log(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn patch_log(&self) -> Vec<(String, serde_json::Value)> {
        self.patches.borrow().clone()
    }
}

impl Transport for InMemoryTransport {
    fn get(&self, url: &str) -> Result<(u16, String)> {
        self.requests.borrow_mut().push(url.to_string());
        Ok(self
            .responses
            .get(url)
            .cloned()
            .unwrap_or((404, String::new())))
    }

    fn get_bytes(&self, url: &str) -> Result<(u16, Vec<u8>)> {
        self.requests.borrow_mut().push(url.to_string());
        Ok(self
            .byte_responses
            .get(url)
            .cloned()
            .unwrap_or((404, Vec::new())))
    }

    fn patch(&self, url: &str, body: &serde_json::Value) -> Result<(u16, String)> {
        self.patches
            .borrow_mut()
            .push((url.to_string(), body.clone()));
        Ok(self
            .patch_responses
            .get(url)
            .cloned()
            .unwrap_or((404, String::new())))
    }
}
