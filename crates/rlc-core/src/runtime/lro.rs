use serde_json::Value;

use crate::descriptors::OperationDescriptor;
use crate::error::RuntimeError;

use super::invoke::{Arguments, build_request, deserialize};
use super::transport::{Request, Response, Transport};

const ACCEPTED: u16 = 202;

/// Drives a long-running operation: the initial request, then GETs against
/// `operation-location` (or `location`) while the service answers 202.
pub struct LroPoller<'a, T: Transport> {
    operation: &'a OperationDescriptor,
    transport: &'a mut T,
    poll_url: Option<String>,
    result: Option<Value>,
    polls: usize,
}

impl<'a, T: Transport> LroPoller<'a, T> {
    /// Send the initial request and record where to poll.
    pub fn begin(
        operation: &'a OperationDescriptor,
        transport: &'a mut T,
        args: &Arguments,
    ) -> Result<Self, RuntimeError> {
        let request = build_request(operation, args)?;
        let response = transport.send(&request)?;
        let mut poller = LroPoller {
            operation,
            transport,
            poll_url: None,
            result: None,
            polls: 0,
        };
        poller.handle(response)?;
        Ok(poller)
    }

    pub fn is_done(&self) -> bool {
        self.result.is_some()
    }

    /// The final value once the operation completed.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    /// One polling round trip. A no-op once done.
    pub fn poll(&mut self) -> Result<(), RuntimeError> {
        if self.is_done() {
            return Ok(());
        }
        let url = self
            .poll_url
            .clone()
            .ok_or(RuntimeError::MissingPollingLocation)?;
        let response = self.transport.send(&Request::get(url))?;
        self.polls += 1;
        self.handle(response)
    }

    pub fn poll_until_done(mut self) -> Result<Value, RuntimeError> {
        while !self.is_done() {
            self.poll()?;
        }
        log::debug!(
            "{}: completed after {} polls",
            self.operation.name,
            self.polls
        );
        self.result.ok_or(RuntimeError::MissingPollingLocation)
    }

    fn handle(&mut self, response: Response) -> Result<(), RuntimeError> {
        if response.status == ACCEPTED {
            let location = response
                .header("operation-location")
                .or_else(|| response.header("location"))
                .map(String::from);
            if location.is_some() {
                self.poll_url = location;
            }
            if self.poll_url.is_none() {
                return Err(RuntimeError::MissingPollingLocation);
            }
            return Ok(());
        }
        self.result = Some(deserialize(self.operation, &response)?);
        Ok(())
    }
}
