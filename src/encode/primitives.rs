//! [`FixedEncode`] implementations for built-in types.

use super::{Encoder, FixedEncode};
use crate::error::{Result, ShapeBloomError};

macro_rules! impl_scalar {
    ($($t:ty => $put:ident),* $(,)?) => {
        $(
            impl FixedEncode for $t {
                #[inline]
                fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
                    out.$put(*self);
                    Ok(())
                }
            }
        )*
    };
}

impl_scalar! {
    u16 => put_u16,
    u32 => put_u32,
    u64 => put_u64,
    u128 => put_u128,
    i16 => put_i16,
    i32 => put_i32,
    i64 => put_i64,
    i128 => put_i128,
    f32 => put_f32,
    f64 => put_f64,
}

impl FixedEncode for u8 {
    #[inline]
    fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
        out.put_u8(*self);
        Ok(())
    }
}

impl FixedEncode for i8 {
    #[inline]
    fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
        out.put_u8(self.to_ne_bytes()[0]);
        Ok(())
    }
}

impl FixedEncode for bool {
    #[inline]
    fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
        out.put_u8(u8::from(*self));
        Ok(())
    }
}

impl FixedEncode for char {
    #[inline]
    fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
        out.put_u32(u32::from(*self));
        Ok(())
    }
}

impl FixedEncode for () {
    #[inline]
    fn encode(&self, _out: &mut Encoder<'_>) -> Result<()> {
        Ok(())
    }
}

impl FixedEncode for usize {
    fn encode(&self, _out: &mut Encoder<'_>) -> Result<()> {
        Self::check_shape()
    }

    fn check_shape() -> Result<()> {
        Err(ShapeBloomError::encoding::<Self>(
            "platform-dependent width, use u32 or u64",
        ))
    }
}

impl FixedEncode for isize {
    fn encode(&self, _out: &mut Encoder<'_>) -> Result<()> {
        Self::check_shape()
    }

    fn check_shape() -> Result<()> {
        Err(ShapeBloomError::encoding::<Self>(
            "platform-dependent width, use i32 or i64",
        ))
    }
}

impl FixedEncode for str {
    fn encode(&self, _out: &mut Encoder<'_>) -> Result<()> {
        Self::check_shape()
    }

    fn check_shape() -> Result<()> {
        Err(ShapeBloomError::encoding::<Self>(
            "variable-width text, encode its bytes as a fixed-size array",
        ))
    }
}

impl FixedEncode for String {
    fn encode(&self, _out: &mut Encoder<'_>) -> Result<()> {
        Self::check_shape()
    }

    fn check_shape() -> Result<()> {
        Err(ShapeBloomError::encoding::<Self>(
            "variable-width text, encode its bytes as a fixed-size array",
        ))
    }
}

// Element types are checked up front: an empty slice writes nothing, but
// its shape is still the element type's.
impl<T: FixedEncode> FixedEncode for [T] {
    fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
        T::check_shape()?;
        for item in self {
            item.encode(out)?;
        }
        Ok(())
    }

    #[inline]
    fn check_shape() -> Result<()> {
        T::check_shape()
    }
}

impl<T: FixedEncode, const N: usize> FixedEncode for [T; N] {
    #[inline]
    fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
        self.as_slice().encode(out)
    }

    #[inline]
    fn check_shape() -> Result<()> {
        T::check_shape()
    }
}

impl<T: FixedEncode> FixedEncode for Vec<T> {
    #[inline]
    fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
        self.as_slice().encode(out)
    }

    #[inline]
    fn check_shape() -> Result<()> {
        T::check_shape()
    }
}

impl<T: FixedEncode + ?Sized> FixedEncode for &T {
    #[inline]
    fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
        (**self).encode(out)
    }

    #[inline]
    fn check_shape() -> Result<()> {
        T::check_shape()
    }
}

impl<T: FixedEncode + ?Sized> FixedEncode for Box<T> {
    #[inline]
    fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
        (**self).encode(out)
    }

    #[inline]
    fn check_shape() -> Result<()> {
        T::check_shape()
    }
}

macro_rules! impl_tuple {
    ($(($($name:ident . $idx:tt),+)),* $(,)?) => {
        $(
            impl<$($name: FixedEncode),+> FixedEncode for ($($name,)+) {
                #[inline]
                fn encode(&self, out: &mut Encoder<'_>) -> Result<()> {
                    $( self.$idx.encode(out)?; )+
                    Ok(())
                }

                #[inline]
                fn check_shape() -> Result<()> {
                    $( $name::check_shape()?; )+
                    Ok(())
                }
            }
        )*
    };
}

impl_tuple! {
    (A.0),
    (A.0, B.1),
    (A.0, B.1, C.2),
    (A.0, B.1, C.2, D.3),
    (A.0, B.1, C.2, D.3, E.4),
    (A.0, B.1, C.2, D.3, E.4, F.5),
    (A.0, B.1, C.2, D.3, E.4, F.5, G.6),
    (A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7),
}
