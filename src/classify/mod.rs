//! Total classification of the code-point space and derived metadata:
//! category, names, versions, blocks, planes, and the encoding forms.

/// Category enum and the classifier.
pub mod category;
/// UTF-8/UTF-16 hex encoders.
pub mod encoding;

pub use category::{Category, Classifier, is_private_use, is_surrogate};
