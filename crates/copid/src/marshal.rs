//! Proxy marshaling capability.
//!
//! Marshaling is how the wire-format object reference is obtained from a
//! live proxy: serialize the interface pointer as if it were crossing to
//! another context, then read the bytes back out of the stream. The
//! marshal data holds a reference on the proxy until it is released, so
//! implementations must release it on every exit path.

use bytes::Bytes;

use crate::types::Result;

/// Produces the wire-format object reference for an in-process proxy.
pub trait ProxyMarshaler {
    /// Opaque handle type for the proxy being interrogated
    type Proxy: ?Sized;

    /// Marshal the proxy and return a copy of the wire bytes.
    ///
    /// On return, whatever stream or marshal data the implementation
    /// acquired has been released again, whether or not the call
    /// succeeded; the proxy's reference count is unchanged.
    fn marshal(&self, proxy: &Self::Proxy) -> Result<Bytes>;
}

#[cfg(windows)]
pub use self::win32::ComMarshaler;

#[cfg(windows)]
mod win32 {
    use bytes::Bytes;
    use windows::core::{GUID, IUnknown, Interface};
    use windows::Win32::Foundation::HGLOBAL;
    use windows::Win32::System::Com::Marshal::{CoMarshalInterface, CoReleaseMarshalData};
    use windows::Win32::System::Com::StructuredStorage::{
        CreateStreamOnHGlobal, GetHGlobalFromStream,
    };
    use windows::Win32::System::Com::{IStream, MSHCTX_INPROC, MSHLFLAGS_NORMAL, STREAM_SEEK_SET};
    use windows::Win32::System::Memory::{GlobalLock, GlobalSize, GlobalUnlock};

    use super::ProxyMarshaler;
    use crate::types::{LookupError, Result};

    /// IProxyManager: implemented only by the proxy manager behind
    /// standard proxies.
    const IID_IPROXY_MANAGER: GUID = GUID::from_u128(0x00000008_0000_0000_c000_000000000046);

    /// Marshaler over the in-process COM marshaling facility.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct ComMarshaler;

    impl ComMarshaler {
        /// Only standard proxies marshal with the object-reference
        /// layout this crate parses; anything else (in-process objects,
        /// custom marshalers) is rejected up front.
        fn ensure_standard_proxy(proxy: &IUnknown) -> Result<()> {
            let mut raw = std::ptr::null_mut();
            let hr = unsafe { proxy.query(&IID_IPROXY_MANAGER, &mut raw) };
            if hr.is_err() {
                return Err(LookupError::Marshal(
                    "not a standard proxy; wire layout unknown".to_string(),
                ));
            }
            // Balance the reference the query took.
            drop(unsafe { IUnknown::from_raw(raw) });
            Ok(())
        }

        /// Copy the marshaled bytes out of the stream's backing
        /// allocation.
        fn copy_stream_bytes(stream: &IStream) -> Result<Bytes> {
            let hglobal: HGLOBAL = unsafe { GetHGlobalFromStream(stream) }
                .map_err(|err| LookupError::Marshal(err.to_string()))?;

            let ptr = unsafe { GlobalLock(hglobal) };
            if ptr.is_null() {
                return Err(LookupError::Marshal("GlobalLock failed".to_string()));
            }
            let len = unsafe { GlobalSize(hglobal) };
            let bytes = unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) }.to_vec();
            let _ = unsafe { GlobalUnlock(hglobal) };

            Ok(Bytes::from(bytes))
        }
    }

    impl ProxyMarshaler for ComMarshaler {
        type Proxy = IUnknown;

        fn marshal(&self, proxy: &IUnknown) -> Result<Bytes> {
            Self::ensure_standard_proxy(proxy)?;

            let stream: IStream = unsafe { CreateStreamOnHGlobal(HGLOBAL::default(), true) }
                .map_err(|err| LookupError::Marshal(err.to_string()))?;

            unsafe {
                CoMarshalInterface(
                    &stream,
                    &IUnknown::IID,
                    proxy,
                    MSHCTX_INPROC.0 as u32,
                    None,
                    MSHLFLAGS_NORMAL.0 as u32,
                )
            }
            .map_err(|err| LookupError::Marshal(err.to_string()))?;

            let copied = Self::copy_stream_bytes(&stream);

            // Rewind and release the marshal data so the reference the
            // marshal took on the proxy is dropped again; this must
            // happen whether or not the copy succeeded. The stream
            // itself releases on drop.
            unsafe {
                let _ = stream.Seek(0, STREAM_SEEK_SET, None);
                let _ = CoReleaseMarshalData(&stream);
            }

            copied
        }
    }
}
