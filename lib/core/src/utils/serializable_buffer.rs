/*
 * Copyright (C) 2022-2024 by Christian Fischer
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use core::ops::{Deref, DerefMut};

/// A fixed size array that Serde can (de)serialize without running into the
/// upstream "arrays only impl Serialize up to 32 elements" limitation, and
/// that is usable in `no_std` builds without `alloc`.
///
/// VRAM, WRAM, OAM, HRAM and wave RAM are all backed by this type rather
/// than a `Vec`, so their size is known at compile time and no heap
/// allocation is required to run with the `dyn_alloc` feature disabled.
#[derive(Clone)]
pub struct SerializableArray<T, const SIZE: usize>(
    [T; SIZE]
);

impl<T: Copy + Default, const SIZE: usize> SerializableArray<T, SIZE> {
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }
}

impl<T, const SIZE: usize> From<[T; SIZE]> for SerializableArray<T, SIZE> {
    fn from(value: [T; SIZE]) -> Self {
        Self(value)
    }
}

impl<T, const SIZE: usize> From<SerializableArray<T, SIZE>> for [T; SIZE] {
    fn from(value: SerializableArray<T, SIZE>) -> Self {
        value.0
    }
}

impl<T, const SIZE: usize> Deref for SerializableArray<T, SIZE> {
    type Target = [T; SIZE];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T, const SIZE: usize> DerefMut for SerializableArray<T, SIZE> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(feature = "serde")]
mod serde_support {
    use super::SerializableArray;
    use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
    use serde::ser::{Serialize, SerializeTuple, Serializer};
    use core::fmt;
    use core::marker::PhantomData;

    impl<T: Serialize, const SIZE: usize> Serialize for SerializableArray<T, SIZE> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut tup = serializer.serialize_tuple(SIZE)?;
            for item in self.0.iter() {
                tup.serialize_element(item)?;
            }
            tup.end()
        }
    }

    struct ArrayVisitor<T, const SIZE: usize>(PhantomData<T>);

    impl<'de, T: Deserialize<'de> + Copy + Default, const SIZE: usize> Visitor<'de> for ArrayVisitor<T, SIZE> {
        type Value = [T; SIZE];

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "an array of length {}", SIZE)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut arr = [T::default(); SIZE];
            for slot in arr.iter_mut() {
                *slot = seq.next_element()?.ok_or_else(|| serde::de::Error::invalid_length(SIZE, &self))?;
            }
            Ok(arr)
        }
    }

    impl<'de, T: Deserialize<'de> + Copy + Default, const SIZE: usize> Deserialize<'de> for SerializableArray<T, SIZE> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let arr = deserializer.deserialize_tuple(SIZE, ArrayVisitor::<T, SIZE>(PhantomData))?;
            Ok(SerializableArray(arr))
        }
    }
}
