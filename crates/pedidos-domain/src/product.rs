// product.rs
use crate::{DomainError, OrderLine, ProductId};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

static SEED_PRODUCTS: Lazy<Vec<Product>> = Lazy::new(|| {
  vec![Product::raw(1, "Cable eléctrico", 100, 5000),
       Product::raw(2, "Interruptor", 50, 1500),
       Product::raw(3, "Tomacorriente", 75, 1200),
       Product::raw(4, "Lámpara LED", 30, 3500),
       Product::raw(5, "Cinta aislante", 200, 500)]
});

/// Producto del catálogo. `stock` y `price` son enteros sin signo: nunca
/// pueden ser negativos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub id: ProductId,
  pub name: String,
  pub stock: u32,
  pub price: u64,
}

impl Product {
  pub fn new(id: ProductId, name: &str, stock: u32, price: u64) -> Result<Self, DomainError> {
    if id == 0 {
      return Err(DomainError::ValidationError("El id de producto debe ser positivo".to_string()));
    }
    if name.trim().is_empty() {
      return Err(DomainError::ValidationError("El nombre del producto no puede estar vacío".to_string()));
    }
    Ok(Self::raw(id, name.trim(), stock, price))
  }

  fn raw(id: ProductId, name: &str, stock: u32, price: u64) -> Self {
    Self { id, name: name.to_string(), stock, price }
  }
}

impl fmt::Display for Product {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Producto(id: {}, nombre: {}, stock: {}, precio: {})", self.id, self.name, self.stock, self.price)
  }
}

/// Línea que pide más unidades de las disponibles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockShortage {
  pub product_id: ProductId,
  /// `None` si el producto ya no está en el catálogo.
  pub product_name: Option<String>,
  pub requested: u32,
  pub available: u32,
}

/// Catálogo de productos indexado por id, en orden de alta.
///
/// Se serializa como la lista de productos; al deserializar se rechazan ids
/// repetidos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Product>", try_from = "Vec<Product>")]
pub struct Catalog {
  products: IndexMap<ProductId, Product>,
}

impl Catalog {
  pub fn empty() -> Self {
    Self { products: IndexMap::new() }
  }

  /// Catálogo inicial del negocio.
  pub fn seed() -> Self {
    Self { products: SEED_PRODUCTS.iter().map(|p| (p.id, p.clone())).collect() }
  }

  pub fn from_products<I>(products: I) -> Result<Self, DomainError>
    where I: IntoIterator<Item = Product>
  {
    let mut catalog = Self::empty();
    for p in products {
      catalog.add(p)?;
    }
    Ok(catalog)
  }

  pub fn find(&self, id: ProductId) -> Option<&Product> {
    self.products.get(&id)
  }

  pub fn get(&self, id: ProductId) -> Result<&Product, DomainError> {
    self.find(id).ok_or_else(|| DomainError::NotFound(format!("producto {}", id)))
  }

  pub fn products(&self) -> impl Iterator<Item = &Product> {
    self.products.values()
  }

  pub fn len(&self) -> usize {
    self.products.len()
  }

  pub fn is_empty(&self) -> bool {
    self.products.is_empty()
  }

  pub fn add(&mut self, product: Product) -> Result<(), DomainError> {
    if product.id == 0 || product.name.trim().is_empty() {
      return Err(DomainError::ValidationError(format!("Producto inválido: {}", product.id)));
    }
    if self.products.contains_key(&product.id) {
      return Err(DomainError::Conflict(format!("producto {} ya existe", product.id)));
    }
    self.products.insert(product.id, product);
    Ok(())
  }

  pub fn set_price(&mut self, id: ProductId, price: u64) -> Result<(), DomainError> {
    self.get_mut(id)?.price = price;
    Ok(())
  }

  pub fn set_stock(&mut self, id: ProductId, stock: u32) -> Result<(), DomainError> {
    self.get_mut(id)?.stock = stock;
    Ok(())
  }

  /// Quita el producto conservando el orden del resto.
  pub fn remove(&mut self, id: ProductId) -> Result<Product, DomainError> {
    self.products
        .shift_remove(&id)
        .ok_or_else(|| DomainError::NotFound(format!("producto {}", id)))
  }

  /// Precio vigente × cantidad. Un producto ausente aporta 0.
  pub fn line_total(&self, line: &OrderLine) -> u64 {
    self.find(line.product_id)
        .map(|p| p.price.saturating_mul(u64::from(line.quantity)))
        .unwrap_or(0)
  }

  pub fn total(&self, lines: &[OrderLine]) -> u64 {
    lines.iter().fold(0u64, |acc, l| acc.saturating_add(self.line_total(l)))
  }

  /// Líneas cuya cantidad supera el stock actual. Un producto ausente cuenta
  /// con stock 0.
  pub fn check_stock(&self, lines: &[OrderLine]) -> Vec<StockShortage> {
    lines.iter()
         .filter_map(|line| {
           let product = self.find(line.product_id);
           let available = product.map(|p| p.stock).unwrap_or(0);
           (line.quantity > available).then(|| StockShortage { product_id: line.product_id,
                                                               product_name: product.map(|p| p.name.clone()),
                                                               requested: line.quantity,
                                                               available })
         })
         .collect()
  }

  fn get_mut(&mut self, id: ProductId) -> Result<&mut Product, DomainError> {
    self.products
        .get_mut(&id)
        .ok_or_else(|| DomainError::NotFound(format!("producto {}", id)))
  }
}

impl Default for Catalog {
  fn default() -> Self {
    Self::seed()
  }
}

impl From<Catalog> for Vec<Product> {
  fn from(c: Catalog) -> Self {
    c.products.into_values().collect()
  }
}

impl TryFrom<Vec<Product>> for Catalog {
  type Error = DomainError;

  fn try_from(products: Vec<Product>) -> Result<Self, Self::Error> {
    Self::from_products(products)
  }
}
