use bytes::{BufMut, Bytes, BytesMut};

/// Unified wire encoding trait across the frame, header and body layers.
pub trait WireEncode {
    type Error: std::fmt::Debug + Send + Sync + 'static;
    type Context;

    fn encoded_len(&self, ctx: &Self::Context) -> usize;
    fn encode_to<B: BufMut>(&self, dst: &mut B, ctx: &Self::Context) -> Result<(), Self::Error>;

    /// Render into a fresh buffer sized by [`encoded_len`].
    ///
    /// Registry handlers produce owned body bytes, so this is the form they
    /// use.
    ///
    /// [`encoded_len`]: WireEncode::encoded_len
    fn encode_to_vec(&self, ctx: &Self::Context) -> Result<Vec<u8>, Self::Error> {
        let mut buf = BytesMut::with_capacity(self.encoded_len(ctx));
        self.encode_to(&mut buf, ctx)?;
        Ok(buf.to_vec())
    }
}

/// Unified zero-copy wire decoding trait across the same layers.
pub trait WireDecode: Sized {
    type Error: std::fmt::Debug + Send + Sync + 'static;
    type Context;

    /// Parse from `input`, returning the remaining slice and the parsed value.
    /// `parent` permits zero-copy `Bytes::slice_ref` construction when the
    /// input is a view into an owned buffer.
    fn parse<'a>(
        input: &'a [u8],
        parent: &Bytes,
        ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error>;
}
