//! Top-level vs. embedded pointer encoding (SPEC_FULL.md §4.C), transcribed
//! from `dcerpc_encode_ptr`/`dcerpc_decode_ptr`: a REF pointer is never
//! null and never emits a referent id at the top level; a UNIQUE pointer
//! always emits a referent id slot (zero for null) and may be null.
//!
//! Embedded referents (top_level == false) are not marshalled in place:
//! the id is emitted immediately and the referent's own bytes are pushed
//! onto the encoder's/decoder's deferred queue, to run after the
//! enclosing structure's fixed part is complete. The C original fills a
//! caller-supplied `void *` when a deferred decode job runs; there is no
//! safe equivalent, so an embedded decode instead hands back a pointer
//! type wrapping an `Rc<RefCell<Option<T>>>` that the deferred job fills
//! in, and that [`NdrDecoder::process_deferred`] must have drained before
//! [`RefPtr::into_inner`]/[`UniquePtr::into_inner`] is called.

use super::{NdrCodec, NdrDecoder, NdrEncoder};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::rc::Rc;

/// A pointer that is never null. At the top level it marshals its referent
/// inline with no referent id; embedded, it emits a referent id and defers
/// the referent itself.
#[derive(Debug, Clone)]
pub struct RefPtr<T>(Rc<RefCell<Option<T>>>);

impl<T> RefPtr<T> {
    pub fn new(val: T) -> Self {
        RefPtr(Rc::new(RefCell::new(Some(val))))
    }

    /// Unwraps the referent. Panics if called on an embedded pointer before
    /// the decoder's deferred queue has been drained — callers that decode
    /// through [`crate::client::Client::call`] never observe this, since
    /// the orchestrator always drains before returning the response value.
    pub fn into_inner(self) -> T
    where
        T: Clone,
    {
        match Rc::try_unwrap(self.0) {
            Ok(cell) => cell
                .into_inner()
                .expect("ref pointer referent read before process_deferred"),
            Err(rc) => rc
                .borrow()
                .clone()
                .expect("ref pointer referent read before process_deferred"),
        }
    }
}

impl<T: PartialEq> PartialEq for RefPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.0.borrow() == *other.0.borrow()
    }
}
impl<T: Eq> Eq for RefPtr<T> {}

impl<T: Clone> RefPtr<T> {
    fn snapshot(&self) -> T {
        self.0
            .borrow()
            .clone()
            .expect("ref pointer encoded with no referent")
    }
}

impl<T: NdrCodec + Clone + 'static> NdrCodec for RefPtr<T> {
    fn ndr_encode(&self, enc: &mut NdrEncoder, top_level: bool) -> Result<()> {
        enc.align(enc.syntax.ptr_align())?;
        let referent = self.snapshot();
        if top_level {
            return referent.ndr_encode(enc, false);
        }
        let id = enc.next_ptr_id();
        enc.put_3264(id)?;
        enc.defer(Box::new(move |enc| referent.ndr_encode(enc, false)))
    }

    fn ndr_decode(dec: &mut NdrDecoder, top_level: bool) -> Result<Self> {
        dec.align(dec.syntax.ptr_align())?;
        if top_level {
            return Ok(RefPtr::new(T::ndr_decode(dec, false)?));
        }
        let id = dec.get_3264()?;
        if id == 0 {
            return Err(Error::Protocol(
                "REF pointer referent id must not be zero".to_string(),
            ));
        }
        let cell: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
        let fill = cell.clone();
        dec.defer(Box::new(move |dec| {
            *fill.borrow_mut() = Some(T::ndr_decode(dec, false)?);
            Ok(())
        }))?;
        Ok(RefPtr(cell))
    }
}

/// A pointer that may be null. Top-level and embedded cases both emit a
/// referent id slot (0 == null); only the *placement* of the referent's
/// bytes differs (inline vs. deferred).
#[derive(Debug, Clone)]
pub struct UniquePtr<T>(Option<Rc<RefCell<Option<T>>>>);

impl<T> UniquePtr<T> {
    pub fn some(val: T) -> Self {
        UniquePtr(Some(Rc::new(RefCell::new(Some(val)))))
    }

    pub fn none() -> Self {
        UniquePtr(None)
    }

    /// Unwraps the referent, if any. Panics under the same embedded/
    /// not-yet-drained condition as [`RefPtr::into_inner`].
    pub fn into_inner(self) -> Option<T>
    where
        T: Clone,
    {
        self.0.map(|rc| match Rc::try_unwrap(rc) {
            Ok(cell) => cell
                .into_inner()
                .expect("unique pointer referent read before process_deferred"),
            Err(rc) => rc
                .borrow()
                .clone()
                .expect("unique pointer referent read before process_deferred"),
        })
    }
}

impl<T: PartialEq> PartialEq for UniquePtr<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}
impl<T: Eq> Eq for UniquePtr<T> {}

impl<T: NdrCodec + Clone + 'static> NdrCodec for UniquePtr<T> {
    fn ndr_encode(&self, enc: &mut NdrEncoder, top_level: bool) -> Result<()> {
        enc.align(enc.syntax.ptr_align())?;
        let Some(cell) = &self.0 else {
            return enc.put_3264(0);
        };
        let referent = cell
            .borrow()
            .clone()
            .expect("unique pointer encoded with no referent");
        let id = enc.next_ptr_id();
        enc.put_3264(id)?;
        if top_level {
            return referent.ndr_encode(enc, false);
        }
        enc.defer(Box::new(move |enc| referent.ndr_encode(enc, false)))
    }

    fn ndr_decode(dec: &mut NdrDecoder, top_level: bool) -> Result<Self> {
        dec.align(dec.syntax.ptr_align())?;
        let id = dec.get_3264()?;
        if id == 0 {
            return Ok(UniquePtr(None));
        }
        if top_level {
            return Ok(UniquePtr::some(T::ndr_decode(dec, false)?));
        }
        let cell: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
        let fill = cell.clone();
        dec.defer(Box::new(move |dec| {
            *fill.borrow_mut() = Some(T::ndr_decode(dec, false)?);
            Ok(())
        }))?;
        Ok(UniquePtr(Some(cell)))
    }
}
