use std::collections::VecDeque;

use serde_json::Value;

use crate::descriptors::OperationDescriptor;
use crate::error::RuntimeError;

use super::invoke::{Arguments, build_request, deserialize};
use super::transport::{Request, Transport};

enum Cursor {
    First,
    Next(String),
    Done,
}

/// Items of a paging operation, fetched page by page as the iterator is driven.
///
/// Reads the item array from the descriptor's item field and follows the
/// next-link field until it is absent or empty.
pub struct PagedItems<'a, T: Transport> {
    operation: &'a OperationDescriptor,
    transport: &'a mut T,
    args: Arguments,
    cursor: Cursor,
    buffer: VecDeque<Value>,
    pages: usize,
}

impl<'a, T: Transport> PagedItems<'a, T> {
    pub fn new(operation: &'a OperationDescriptor, transport: &'a mut T, args: Arguments) -> Self {
        PagedItems {
            operation,
            transport,
            args,
            cursor: Cursor::First,
            buffer: VecDeque::new(),
            pages: 0,
        }
    }

    /// Pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    fn fetch(&mut self) -> Result<(), RuntimeError> {
        let request = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::First => build_request(self.operation, &self.args)?,
            Cursor::Next(link) => Request::get(link),
            Cursor::Done => return Ok(()),
        };
        let response = self.transport.send(&request)?;
        let page = deserialize(self.operation, &response)?;
        self.pages += 1;

        let item_field = self.operation.paging_item_field().unwrap_or("value");
        let items = page
            .get(item_field)
            .and_then(Value::as_array)
            .ok_or_else(|| RuntimeError::MissingPageItems(item_field.to_string()))?;
        self.buffer.extend(items.iter().cloned());

        if let Some(link) = self
            .operation
            .paging_next_link_field()
            .and_then(|field| page.get(field))
            .and_then(Value::as_str)
            .filter(|link| !link.is_empty())
        {
            self.cursor = Cursor::Next(link.to_string());
        }
        log::debug!(
            "{}: page {} yielded {} items",
            self.operation.name,
            self.pages,
            items.len()
        );
        Ok(())
    }
}

impl<T: Transport> Iterator for PagedItems<'_, T> {
    type Item = Result<Value, RuntimeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            if matches!(self.cursor, Cursor::Done) {
                return None;
            }
            if let Err(err) = self.fetch() {
                return Some(Err(err));
            }
        }
    }
}
