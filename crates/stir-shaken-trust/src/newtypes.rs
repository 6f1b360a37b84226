// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::borrow::Cow;

macro_rules! bytes_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name<'a>(Cow<'a, [u8]>);

        impl<'a> $name<'a> {
            pub const fn borrowed(data: &'a [u8]) -> Self {
                Self(Cow::Borrowed(data))
            }

            pub fn owned(data: Vec<u8>) -> $name<'static> {
                $name(Cow::Owned(data))
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn into_owned(self) -> Vec<u8> {
                self.0.into_owned()
            }
        }
    };
}

bytes_newtype!(PayloadBytes);
bytes_newtype!(SignatureBytes);
bytes_newtype!(PublicKeyBytes);
bytes_newtype!(PrivateKeyBytes);
