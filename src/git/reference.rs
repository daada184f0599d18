//! Conversion of commit-ish values into canonical object ids.
//!
//! Accepted forms: an `Oid`, hex text (short prefixes are zero-padded),
//! raw bytes (up to 20, zero-padded), or anything that carries an id
//! (commits, trees, blobs, objects, folders, files).

use git2::{Blob, Commit, Object, Oid, Tree};

use crate::error::{Error, Result};

const RAW_LEN: usize = 20;

pub trait ToOid {
    fn to_oid(&self) -> Result<Oid>;
}

impl ToOid for Oid {
    fn to_oid(&self) -> Result<Oid> {
        Ok(*self)
    }
}

impl ToOid for str {
    fn to_oid(&self) -> Result<Oid> {
        if self.is_empty() {
            return Err(Error::UnconvertibleReference("\"\"".to_string()));
        }
        Oid::from_str(self).map_err(|_| Error::UnconvertibleReference(format!("{:?}", self)))
    }
}

impl ToOid for String {
    fn to_oid(&self) -> Result<Oid> {
        self.as_str().to_oid()
    }
}

impl ToOid for [u8] {
    fn to_oid(&self) -> Result<Oid> {
        if self.is_empty() || self.len() > RAW_LEN {
            return Err(Error::UnconvertibleReference(format!("{:?}", self)));
        }
        let mut raw = [0u8; RAW_LEN];
        raw[..self.len()].copy_from_slice(self);
        Oid::from_bytes(&raw).map_err(|_| Error::UnconvertibleReference(format!("{:?}", self)))
    }
}

impl<const N: usize> ToOid for [u8; N] {
    fn to_oid(&self) -> Result<Oid> {
        self.as_slice().to_oid()
    }
}

impl ToOid for Vec<u8> {
    fn to_oid(&self) -> Result<Oid> {
        self.as_slice().to_oid()
    }
}

impl<T: ToOid> ToOid for Option<T> {
    fn to_oid(&self) -> Result<Oid> {
        match self {
            Some(value) => value.to_oid(),
            None => Err(Error::UnconvertibleReference("None".to_string())),
        }
    }
}

impl<T: ToOid + ?Sized> ToOid for &T {
    fn to_oid(&self) -> Result<Oid> {
        (**self).to_oid()
    }
}

impl ToOid for Commit<'_> {
    fn to_oid(&self) -> Result<Oid> {
        Ok(self.id())
    }
}

impl ToOid for Tree<'_> {
    fn to_oid(&self) -> Result<Oid> {
        Ok(self.id())
    }
}

impl ToOid for Blob<'_> {
    fn to_oid(&self) -> Result<Oid> {
        Ok(self.id())
    }
}

impl ToOid for Object<'_> {
    fn to_oid(&self) -> Result<Oid> {
        Ok(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oid_is_identity() {
        let oid = Oid::from_str("4bdf2944e2188cdb8427749317c147239dc212c7").unwrap();
        assert_eq!(oid.to_oid().unwrap(), oid);
        assert_eq!((&oid).to_oid().unwrap(), oid);
    }

    #[test]
    fn hex_text_is_padded() {
        let expected = Oid::from_str("1000000000000000000000000000000000000000").unwrap();
        assert_eq!("1".to_oid().unwrap(), expected);
        assert_eq!(String::from("1").to_oid().unwrap(), expected);
    }

    #[test]
    fn raw_bytes_are_padded() {
        let mut raw = [0u8; 20];
        raw[0] = b'1';
        let expected = Oid::from_bytes(&raw).unwrap();
        assert_eq!(b"1".to_oid().unwrap(), expected);
        assert_eq!(vec![b'1'].to_oid().unwrap(), expected);
        assert_eq!(raw.to_oid().unwrap(), expected);
    }

    #[test]
    fn unconvertible_values_fail() {
        assert!(matches!(
            None::<Oid>.to_oid(),
            Err(Error::UnconvertibleReference(_))
        ));
        assert!(matches!("x".to_oid(), Err(Error::UnconvertibleReference(_))));
        assert!(matches!("".to_oid(), Err(Error::UnconvertibleReference(_))));
        assert!(matches!(
            [0u8; 21].to_oid(),
            Err(Error::UnconvertibleReference(_))
        ));
        assert!(matches!(
            "0".repeat(41).to_oid(),
            Err(Error::UnconvertibleReference(_))
        ));
    }
}
