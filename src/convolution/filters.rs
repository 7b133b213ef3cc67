use std::borrow::Cow;
use std::collections::HashMap;

use once_cell::sync::Lazy;

pub type Weights = [[f64; 3]; 3];

/// Kernels known to every [KernelRegistry].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FilterType {
    /// Leaves every sample unchanged.
    Identity,
    /// Arithmetic mean of the pixel and its eight neighbors.
    Smooth,
    /// Approximation of Gaussian blur with weights 1-2-1.
    Blur,
    /// Strengthens differences between the pixel and its
    /// horizontal and vertical neighbors.
    Sharpen,
    /// Mean removal: the pixel weighted by 9 minus all of its neighbors.
    MeanRemoval,
    /// Difference between the upper and the lower neighbor.
    Emboss,
}

impl FilterType {
    pub const ALL: [FilterType; 6] = [
        Self::Identity,
        Self::Smooth,
        Self::Blur,
        Self::Sharpen,
        Self::MeanRemoval,
        Self::Emboss,
    ];

    /// Name used to look the kernel up in a registry.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Smooth => "smooth",
            Self::Blur => "blur",
            Self::Sharpen => "sharpen",
            Self::MeanRemoval => "mean",
            Self::Emboss => "emboss",
        }
    }

    pub fn weights(&self) -> Weights {
        match self {
            Self::Identity => [[0., 0., 0.], [0., 1., 0.], [0., 0., 0.]],
            Self::Smooth => [[1. / 9.; 3]; 3],
            Self::Blur => [
                [1. / 16., 2. / 16., 1. / 16.],
                [2. / 16., 4. / 16., 2. / 16.],
                [1. / 16., 2. / 16., 1. / 16.],
            ],
            Self::Sharpen => [
                [0., -2. / 3., 0.],
                [-2. / 3., 11. / 3., -2. / 3.],
                [0., -2. / 3., 0.],
            ],
            Self::MeanRemoval => [[-1., -1., -1.], [-1., 9., -1.], [-1., -1., -1.]],
            Self::Emboss => [[0., 1., 0.], [0., 0., 0.], [0., -1., 0.]],
        }
    }
}

/// Named immutable 3x3 weight matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterKernel {
    name: Cow<'static, str>,
    weights: Weights,
}

impl FilterKernel {
    pub fn new(name: impl Into<Cow<'static, str>>, weights: Weights) -> Self {
        Self {
            name: name.into(),
            weights,
        }
    }

    pub fn identity() -> Self {
        FilterType::Identity.into()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Weight applied to the neighbor shifted by `(di, dj)` from
    /// the center, each offset in `-1..=1`.
    #[inline(always)]
    pub(crate) fn weight_for_offset(&self, di: isize, dj: isize) -> f64 {
        self.weights[(1 - di) as usize][(1 - dj) as usize]
    }
}

impl From<FilterType> for FilterKernel {
    fn from(filter_type: FilterType) -> Self {
        Self::new(filter_type.name(), filter_type.weights())
    }
}

/// Immutable map from names to kernels.
///
/// A registry always contains all kernels from [FilterType].
#[derive(Debug, Clone)]
pub struct KernelRegistry {
    kernels: HashMap<String, FilterKernel>,
    identity: FilterKernel,
}

static DEFAULT_REGISTRY: Lazy<KernelRegistry> = Lazy::new(|| KernelRegistry::builder().build());

impl KernelRegistry {
    /// Registry with built-in kernels, shared by the whole process.
    pub fn global() -> &'static KernelRegistry {
        &DEFAULT_REGISTRY
    }

    pub fn builder() -> KernelRegistryBuilder {
        KernelRegistryBuilder::default()
    }

    /// Returns the kernel registered under `name`.
    ///
    /// Unknown names resolve to the identity kernel.
    pub fn lookup(&self, name: &str) -> &FilterKernel {
        match self.kernels.get(name) {
            Some(kernel) => kernel,
            None => {
                log::warn!("Unknown filter {:?}, the identity filter is used instead", name);
                &self.identity
            }
        }
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.kernels.contains_key(name)
    }

    /// Resolves a sequence of names into a chain of kernels.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Vec<FilterKernel> {
        names
            .iter()
            .map(|name| self.lookup(name.as_ref()).clone())
            .collect()
    }

    /// Names of all registered kernels in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kernels.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::global().clone()
    }
}

/// Collects custom kernels before freezing them into a [KernelRegistry].
#[derive(Debug, Default)]
pub struct KernelRegistryBuilder {
    extra: Vec<FilterKernel>,
}

impl KernelRegistryBuilder {
    /// Registers a kernel. A kernel with the name of an already
    /// registered one replaces it.
    pub fn kernel(mut self, kernel: FilterKernel) -> Self {
        self.extra.push(kernel);
        self
    }

    pub fn build(self) -> KernelRegistry {
        let mut kernels: HashMap<String, FilterKernel> = FilterType::ALL
            .iter()
            .map(|&t| (t.name().to_owned(), FilterKernel::from(t)))
            .collect();
        for kernel in self.extra {
            kernels.insert(kernel.name().to_owned(), kernel);
        }
        KernelRegistry {
            kernels,
            identity: FilterKernel::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown_names() {
        let registry = KernelRegistry::global();
        assert_eq!(registry.lookup("blur"), &FilterKernel::from(FilterType::Blur));
        assert_eq!(registry.lookup("no-such-filter"), &FilterKernel::identity());
        assert!(!registry.contains("no-such-filter"));
        assert_eq!(
            registry.names(),
            vec!["blur", "emboss", "identity", "mean", "sharpen", "smooth"]
        );
    }

    #[test]
    fn custom_kernels() {
        let edges = FilterKernel::new("edges", [[0., 1., 0.], [1., -4., 1.], [0., 1., 0.]]);
        let registry = KernelRegistry::builder().kernel(edges.clone()).build();
        let chain = registry.resolve(&["edges", "smooth", "unknown"]);
        assert_eq!(chain[0], edges);
        assert_eq!(chain[1].name(), "smooth");
        assert_eq!(chain[2].name(), "identity");
        assert!(!KernelRegistry::global().contains("edges"));
    }

    #[test]
    fn weights_are_flipped_for_convolution() {
        let emboss = FilterKernel::from(FilterType::Emboss);
        // Upper neighbor is weighted with the bottom row of the matrix.
        assert_eq!(emboss.weight_for_offset(-1, 0), -1.);
        assert_eq!(emboss.weight_for_offset(1, 0), 1.);
        assert_eq!(emboss.weight_for_offset(0, 0), 0.);
    }

    #[test]
    fn normalized_kernels_sum_to_one() {
        for filter_type in [FilterType::Smooth, FilterType::Blur, FilterType::Sharpen] {
            let sum: f64 = filter_type.weights().iter().flatten().sum();
            assert!((sum - 1.0).abs() < 1e-12, "{:?}", filter_type);
        }
    }
}
