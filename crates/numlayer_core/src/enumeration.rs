use crate::capability::Capability;
use crate::error::{NumericError, Result};
use crate::traits::{NumericProvider, Scalar};
use std::cmp::Ordering;
use std::iter::FusedIterator;

/// Lazy sequence built by repeated `successor` calls.
///
/// Without an end bound the sequence runs until the provider reports
/// `Overflow` for the next successor (the top of a bounded type). With an
/// end bound it stops once the next value would pass the bound. Any other
/// failure is yielded once as an `Err` item, after which the sequence ends.
pub struct Enumeration<'a, T: Scalar> {
    provider: &'a dyn NumericProvider<T>,
    next: Option<Result<T>>,
    end: Option<T>,
}

impl<'a, T: Scalar> Enumeration<'a, T> {
    fn advance(&self, current: &T) -> Option<Result<T>> {
        if let Some(end) = &self.end {
            match self.provider.compare(current, end) {
                Ok(Ordering::Less) => {}
                Ok(_) => return None,
                Err(err) => return Some(Err(err)),
            }
        }
        let following = match self.provider.successor(current) {
            Ok(following) => following,
            Err(NumericError::Overflow { .. }) if self.end.is_none() => return None,
            Err(err) => return Some(Err(err)),
        };
        match &self.end {
            Some(end) => match self.provider.compare(&following, end) {
                Ok(Ordering::Greater) => None,
                Ok(_) => Some(Ok(following)),
                Err(err) => Some(Err(err)),
            },
            None => Some(Ok(following)),
        }
    }
}

impl<'a, T: Scalar> Iterator for Enumeration<'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        let current = self.next.take()?;
        if let Ok(value) = &current {
            self.next = self.advance(value);
        }
        Some(current)
    }
}

impl<'a, T: Scalar> FusedIterator for Enumeration<'a, T> {}

pub fn enumerate_from<T: Scalar>(
    provider: &dyn NumericProvider<T>,
    start: T,
) -> Result<Enumeration<'_, T>> {
    provider.require(Capability::Enumeration, "enumerate_from")?;
    Ok(Enumeration {
        provider,
        next: Some(Ok(start)),
        end: None,
    })
}

/// `start, successor(start), ...` up to and including `end`.
/// Fails with a range error when `start > end`.
pub fn enumerate_from_to<T: Scalar>(
    provider: &dyn NumericProvider<T>,
    start: T,
    end: T,
) -> Result<Enumeration<'_, T>> {
    provider.require(Capability::Enumeration, "enumerate_from_to")?;
    if provider.compare(&start, &end)? == Ordering::Greater {
        return Err(NumericError::range::<T>());
    }
    Ok(Enumeration {
        provider,
        next: Some(Ok(start)),
        end: Some(end),
    })
}
