use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A key value before it is digested.
///
/// Cache keys come in three shapes, mirroring what a caller can hand to a
/// `with_key` hook:
///
/// * `Scalar` - a single value already converted to its string form
/// * `List` - an ordered sequence, normalized by joining elements with `:`
/// * `Map` - unordered entries, normalized after sorting by the key's string form
///
/// # Examples
///
/// ```
/// use cachette_core::{CacheKey, ToCacheKey};
///
/// assert_eq!(42u32.to_cache_key(), CacheKey::scalar(42));
/// assert_eq!(("a", 1).to_cache_key().normalize(), "a:1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Scalar(String),
    List(Vec<CacheKey>),
    Map(Vec<(CacheKey, CacheKey)>),
}

impl CacheKey {
    /// Builds a scalar key from anything with a string form.
    pub fn scalar(value: impl fmt::Display) -> Self {
        CacheKey::Scalar(value.to_string())
    }

    /// Builds a list key from an iterator of keyable items.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToCacheKey,
    {
        CacheKey::List(items.into_iter().map(|item| item.to_cache_key()).collect())
    }

    /// Builds a map key from an iterator of keyable pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToCacheKey,
        V: ToCacheKey,
    {
        CacheKey::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_cache_key(), v.to_cache_key()))
                .collect(),
        )
    }

    /// Converts the key into its canonical string, before any version,
    /// locale or hashing step.
    ///
    /// * lists join the string form of each element with `:`
    /// * maps are sorted by the string form of each entry key, then every
    ///   entry contributes its key and its value to the `:` joined output.
    ///   List values are flattened into the output as well.
    /// * scalars are used as-is
    ///
    /// # Examples
    ///
    /// ```
    /// use cachette_core::CacheKey;
    ///
    /// let key = CacheKey::map([("b", 2), ("a", 1)]);
    /// assert_eq!(key.normalize(), "a:1:b:2");
    ///
    /// let key = CacheKey::list(["x", "y", "z"]);
    /// assert_eq!(key.normalize(), "x:y:z");
    /// ```
    pub fn normalize(&self) -> String {
        match self {
            CacheKey::Scalar(value) => value.clone(),
            CacheKey::List(items) => items
                .iter()
                .map(|item| item.to_string())
                .collect::<Vec<_>>()
                .join(":"),
            CacheKey::Map(entries) => {
                let mut sorted: Vec<(String, &CacheKey, &CacheKey)> = entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), k, v))
                    .collect();
                // Stable sort keeps insertion order for keys with equal string forms.
                sorted.sort_by(|a, b| a.0.cmp(&b.0));

                let mut parts = Vec::with_capacity(sorted.len() * 2);
                for (_, key, value) in sorted {
                    flatten_into(key, &mut parts);
                    flatten_into(value, &mut parts);
                }
                parts.join(":")
            }
        }
    }
}

fn flatten_into(key: &CacheKey, parts: &mut Vec<String>) {
    match key {
        CacheKey::List(items) => {
            for item in items {
                flatten_into(item, parts);
            }
        }
        other => parts.push(other.to_string()),
    }
}

/// String form used when a key is nested inside another key.
impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Scalar(value) => f.write_str(value),
            CacheKey::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            CacheKey::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Conversion into a [`CacheKey`].
///
/// Implemented for the common scalar types, strings, options, sequences,
/// tuples and maps. Implement it for your own types to use them as
/// `with_key` results or as method arguments of class-level cached methods.
///
/// # Examples
///
/// ```
/// use cachette_core::{CacheKey, ToCacheKey};
///
/// struct Sku(u64);
///
/// impl ToCacheKey for Sku {
///     fn to_cache_key(&self) -> CacheKey {
///         CacheKey::scalar(format!("sku-{}", self.0))
///     }
/// }
///
/// assert_eq!(Sku(7).to_cache_key().normalize(), "sku-7");
/// ```
pub trait ToCacheKey {
    fn to_cache_key(&self) -> CacheKey;
}

macro_rules! impl_scalar_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl ToCacheKey for $t {
                fn to_cache_key(&self) -> CacheKey {
                    CacheKey::Scalar(self.to_string())
                }
            }
        )*
    };
}

impl_scalar_key!(
    str, String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
    f32, f64
);

impl ToCacheKey for CacheKey {
    fn to_cache_key(&self) -> CacheKey {
        self.clone()
    }
}

impl<T: ToCacheKey + ?Sized> ToCacheKey for &T {
    fn to_cache_key(&self) -> CacheKey {
        (**self).to_cache_key()
    }
}

impl<T: ToCacheKey + ?Sized> ToCacheKey for Box<T> {
    fn to_cache_key(&self) -> CacheKey {
        (**self).to_cache_key()
    }
}

/// `None` has an empty string form.
impl<T: ToCacheKey> ToCacheKey for Option<T> {
    fn to_cache_key(&self) -> CacheKey {
        match self {
            Some(value) => value.to_cache_key(),
            None => CacheKey::Scalar(String::new()),
        }
    }
}

/// The empty argument list.
impl ToCacheKey for () {
    fn to_cache_key(&self) -> CacheKey {
        CacheKey::List(Vec::new())
    }
}

impl<T: ToCacheKey> ToCacheKey for [T] {
    fn to_cache_key(&self) -> CacheKey {
        CacheKey::List(self.iter().map(ToCacheKey::to_cache_key).collect())
    }
}

impl<T: ToCacheKey, const N: usize> ToCacheKey for [T; N] {
    fn to_cache_key(&self) -> CacheKey {
        self.as_slice().to_cache_key()
    }
}

impl<T: ToCacheKey> ToCacheKey for Vec<T> {
    fn to_cache_key(&self) -> CacheKey {
        self.as_slice().to_cache_key()
    }
}

impl<K: ToCacheKey, V: ToCacheKey, S> ToCacheKey for HashMap<K, V, S> {
    fn to_cache_key(&self) -> CacheKey {
        CacheKey::Map(
            self.iter()
                .map(|(k, v)| (k.to_cache_key(), v.to_cache_key()))
                .collect(),
        )
    }
}

impl<K: ToCacheKey, V: ToCacheKey> ToCacheKey for BTreeMap<K, V> {
    fn to_cache_key(&self) -> CacheKey {
        CacheKey::Map(
            self.iter()
                .map(|(k, v)| (k.to_cache_key(), v.to_cache_key()))
                .collect(),
        )
    }
}

// Tuples are argument lists.
macro_rules! impl_tuple_key {
    ($($name:ident),+) => {
        impl<$($name: ToCacheKey),+> ToCacheKey for ($($name,)+) {
            #[allow(non_snake_case)]
            fn to_cache_key(&self) -> CacheKey {
                let ($($name,)+) = self;
                CacheKey::List(vec![$($name.to_cache_key()),+])
            }
        }
    };
}

impl_tuple_key!(A);
impl_tuple_key!(A, B);
impl_tuple_key!(A, B, C);
impl_tuple_key!(A, B, C, D);
impl_tuple_key!(A, B, C, D, E);
impl_tuple_key!(A, B, C, D, E, F);
impl_tuple_key!(A, B, C, D, E, F, G);
impl_tuple_key!(A, B, C, D, E, F, G, H);
