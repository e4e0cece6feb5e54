//! Record kinds managed by the admin console.

mod berry;
mod product;

pub use berry::{Berry, BerryFlavor, NamedResource};
pub use product::{Product, ProductStatus};

fn is_false(value: &bool) -> bool {
  !*value
}
