use crate::error::Error;

/// Ordered RPC endpoints with a round-robin cursor.
#[derive(Debug, Clone)]
pub struct EndpointPool {
    endpoints: Vec<String>,
    index: usize,
}

impl EndpointPool {
    pub fn new(endpoints: Vec<String>) -> Result<EndpointPool, Error> {
        if endpoints.is_empty() {
            return Err(Error::ConfigurationError(String::from(
                "At least one RPC endpoint is required",
            )));
        }

        Ok(EndpointPool {
            endpoints,
            index: 0,
        })
    }

    pub fn current(&self) -> &str {
        &self.endpoints[self.index]
    }

    pub fn advance(&mut self) -> &str {
        self.index = (self.index + 1) % self.endpoints.len();
        self.current()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
