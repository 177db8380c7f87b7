// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Values that can be joined back into text.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;

/// A value that can be appended to a string.
///
/// Used by [`Collection::into_text`](crate::Collection::into_text) to re-join
/// the results of mapping over a [`Shape::Text`](crate::Shape::Text) input.
/// Results of any other type keep behaving as a sequence.
pub trait TextFragment {
    /// Append this fragment to `out`.
    fn push_onto(&self, out: &mut String);
}

impl TextFragment for char {
    #[inline]
    fn push_onto(&self, out: &mut String) {
        out.push(*self);
    }
}

impl TextFragment for str {
    #[inline]
    fn push_onto(&self, out: &mut String) {
        out.push_str(self);
    }
}

impl TextFragment for String {
    #[inline]
    fn push_onto(&self, out: &mut String) {
        out.push_str(self);
    }
}

impl TextFragment for Box<str> {
    #[inline]
    fn push_onto(&self, out: &mut String) {
        out.push_str(self);
    }
}

impl TextFragment for Cow<'_, str> {
    #[inline]
    fn push_onto(&self, out: &mut String) {
        out.push_str(self);
    }
}

impl<T: TextFragment + ?Sized> TextFragment for &T {
    #[inline]
    fn push_onto(&self, out: &mut String) {
        (**self).push_onto(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Collection;

    #[test]
    fn mixed_fragment_widths_join() {
        let words = Collection::sequence(["ab", "", "c"]);
        assert_eq!(words.into_text(), "abc");
        let owned = Collection::sequence([String::from("x"), String::from("yz")]);
        assert_eq!(owned.into_text(), "xyz");
    }

    #[test]
    fn empty_joins_to_empty() {
        assert_eq!(Collection::text("").into_text(), "");
    }
}
