/*
 * Created on Wed Feb 28 2024
 *
 * This file is a part of Skyresp
 * Skyresp is a free and open-source RESP (REdis Serialization Protocol)
 * value engine written by Sayan Nandan ("the Author") with the vision to
 * provide a compact, zero-copy representation for protocol values without
 * compromising on performance or correctness.
 *
 * Copyright (c) 2024, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

use {
    crate::{error::RespResult, tag::Tag, value::RespValue},
    bytes::Bytes,
    core::ops::{Deref, DerefMut},
    lazy_static::lazy_static,
    parking_lot::Mutex,
};

/// how many scratch buffers the pool retains
const POOL_MAX_BUFFERS: usize = 64;
/// buffers that grew beyond this are not retained
const POOL_MAX_BUFSIZE: usize = 64 * 1024;

lazy_static! {
    static ref SCRATCH: Mutex<Vec<Vec<u8>>> = Mutex::new(Vec::new());
}

/// A pooled scratch buffer for assembling a payload before freezing it into
/// an owned value.
///
/// [`Lease::commit`] hands the filled buffer to the value without copying;
/// the buffer then permanently leaves the pool. Dropping an uncommitted
/// lease returns its buffer for reuse. Holding on to a slice of a lease
/// after it was dropped or committed is a caller bug (and one the borrow
/// checker will reject)
pub struct Lease {
    buf: Option<Vec<u8>>,
}

impl Lease {
    pub(crate) fn new(len: usize) -> Self {
        let mut buf = SCRATCH.lock().pop().unwrap_or_default();
        buf.clear();
        buf.resize(len, 0);
        Self { buf: Some(buf) }
    }
    /// Freeze the filled buffer into an owned value of the given tag
    pub fn commit(mut self, tag: Tag) -> RespResult<RespValue<'static>> {
        let buf = self.buf.take().unwrap_or_default();
        RespValue::of_owned(tag, Bytes::from(buf))
    }
}

impl Deref for Lease {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.buf.as_deref().unwrap_or(&[])
    }
}

impl DerefMut for Lease {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buf.as_deref_mut().unwrap_or(&mut [])
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            if buf.capacity() <= POOL_MAX_BUFSIZE {
                let mut pool = SCRATCH.lock();
                if pool.len() < POOL_MAX_BUFFERS {
                    pool.push(buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{tag::Tag, value::RespValue};

    #[test]
    fn lease_commit_matches_factory() {
        let mut lease = RespValue::lease(5);
        lease.copy_from_slice(b"hello");
        let committed = lease.commit(Tag::BlobString).unwrap();
        assert_eq!(
            committed,
            RespValue::of_bytes(Tag::BlobString, b"hello").unwrap()
        );
    }
    #[test]
    fn lease_commit_large_is_owned() {
        let payload = b"a large payload that cannot be inlined";
        let mut lease = RespValue::lease(payload.len());
        lease.copy_from_slice(payload);
        let committed = lease.commit(Tag::BlobString).unwrap();
        assert_eq!(
            committed,
            RespValue::of_bytes(Tag::BlobString, payload).unwrap()
        );
        assert_eq!(committed.preserve().unwrap(), committed);
    }
    #[test]
    fn dropped_lease_recycles() {
        let lease = RespValue::lease(128);
        drop(lease);
        // the next lease of any size may reuse the recycled buffer; all we
        // can observe from outside is that it is zeroed and sized correctly
        let again = RespValue::lease(16);
        assert_eq!(&*again, &[0u8; 16][..]);
    }
    #[test]
    fn aggregate_tag_rejected_at_commit() {
        let lease = RespValue::lease(4);
        assert!(lease.commit(Tag::Array).is_err());
    }
}
