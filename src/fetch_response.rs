use bytes::Bytes;

#[derive(Debug)]
pub struct FetchResponse {
    /// The complete body, exactly as received
    pub body: Bytes,
    /// Number of transport reads it took to receive the body
    pub chunks: usize,
}

impl FetchResponse {
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
