use log::{debug, info};
use pedidos_domain::{Catalog, DomainError, OrderLine, PanelRepository, Product, ProductId, StockShortage};
use std::sync::Arc;

/// Acceso al catálogo de productos.
///
/// El catálogo se guarda como una colección más; si el almacén todavía no
/// tiene uno, la primera lectura siembra el catálogo inicial.
pub struct CatalogService<R>
    where R: PanelRepository
{
    repo: Arc<R>,
}

impl<R> Clone for CatalogService<R> where R: PanelRepository
{
    fn clone(&self) -> Self {
        Self { repo: self.repo.clone() }
    }
}

impl<R> CatalogService<R> where R: PanelRepository
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Catálogo vigente (sembrándolo si hace falta).
    pub fn load(&self) -> Result<Catalog, DomainError> {
        match self.repo.load_catalog()? {
            Some(c) => Ok(c),
            None => {
                let seed = Catalog::seed();
                self.repo.save_catalog(&seed)?;
                info!("catálogo inicial sembrado ({} productos)", seed.len());
                Ok(seed)
            }
        }
    }

    pub fn find_by_id(&self, id: ProductId) -> Result<Product, DomainError> {
        self.load()?.get(id).cloned()
    }

    pub fn list(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.load()?.products().cloned().collect())
    }

    /// Verificación previa de stock para un borrador de solicitud.
    pub fn check_stock(&self, lines: &[OrderLine]) -> Result<Vec<StockShortage>, DomainError> {
        let shortages = self.load()?.check_stock(lines);
        debug!("verificación de stock: {} líneas, {} con faltante", lines.len(), shortages.len());
        Ok(shortages)
    }

    pub fn add(&self, product: Product) -> Result<(), DomainError> {
        let id = product.id;
        self.mutate(|c| c.add(product))?;
        info!("producto {} agregado", id);
        Ok(())
    }

    pub fn set_price(&self, id: ProductId, price: u64) -> Result<(), DomainError> {
        self.mutate(|c| c.set_price(id, price))?;
        info!("producto {}: precio {}", id, price);
        Ok(())
    }

    pub fn set_stock(&self, id: ProductId, stock: u32) -> Result<(), DomainError> {
        self.mutate(|c| c.set_stock(id, stock))?;
        info!("producto {}: stock {}", id, stock);
        Ok(())
    }

    /// Las solicitudes que referencian el producto se conservan; sus líneas
    /// dejan de sumar al total.
    pub fn remove(&self, id: ProductId) -> Result<Product, DomainError> {
        let mut removed = None;
        self.mutate(|c| {
                removed = Some(c.remove(id)?);
                Ok(())
            })?;
        info!("producto {} eliminado", id);
        removed.ok_or_else(|| DomainError::NotFound(format!("producto {}", id)))
    }

    fn mutate<F>(&self, f: F) -> Result<(), DomainError>
        where F: FnOnce(&mut Catalog) -> Result<(), DomainError>
    {
        let mut catalog = self.load()?;
        f(&mut catalog)?;
        self.repo.save_catalog(&catalog)
    }
}
