use log::info;
use pedidos_domain::{ClaimStatus, NewClaim, NewOrder, NewUser, OrderId, OrderLine, OrderStatus, Resolution, Role,
                     User};
use pedidos_panel::{OrderSummary, Panel, PanelConfig};
use pedidos_persistence::DynPanelRepository;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Menú interactivo del panel de solicitudes y reclamos.
///
/// Las opciones dependen de la sesión: sin sesión se puede ingresar o
/// registrarse; un cliente crea solicitudes y reclamos; un administrador
/// aprueba, despacha, resuelve y administra usuarios y catálogo.
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                             .init();

    let config = PanelConfig::from_env()?;
    let repo = pedidos_persistence::open(config.store_dir.as_deref())?;
    let panel = Panel::open(Arc::new(repo), &config)?;
    info!("panel listo");

    loop {
        let step = match panel.current_user()? {
            None => guest_menu(&panel),
            Some(user) if user.is_admin() => admin_menu(&panel, &user),
            Some(user) => client_menu(&panel, &user),
        };
        match step {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if is_end_of_input(e.as_ref()) => break,
            Err(e) => return Err(e),
        }
    }
    println!("Saliendo...");
    Ok(())
}

fn is_end_of_input(e: &(dyn Error + 'static)) -> bool {
    e.downcast_ref::<io::Error>().is_some_and(|err| err.kind() == io::ErrorKind::UnexpectedEof)
}

fn guest_menu(panel: &Panel<DynPanelRepository>) -> Result<bool, Box<dyn Error>> {
    println!("\n== Panel de pedidos ==");
    println!("1) Ingresar");
    println!("2) Registrarse");
    println!("3) Ver productos");
    println!("0) Salir");
    match prompt("Elige una opción: ")?.trim() {
        "1" => {
            let username = prompt("Usuario: ")?;
            let password = prompt("Contraseña: ")?;
            match panel.login(username.trim(), password.trim()) {
                Ok(u) => println!("Bienvenido, {}", u.name().unwrap_or(u.username())),
                Err(e) => eprintln!("Error ingresando: {}", e),
            }
        }
        "2" => {
            let mut candidate = NewUser::new(prompt("Usuario: ")?.trim(), prompt("Contraseña: ")?.trim());
            candidate.name = optional(prompt("Nombre (enter para vacío): ")?);
            candidate.email = optional(prompt("Email (enter para vacío): ")?);
            candidate.phone = optional(prompt("Teléfono (enter para vacío): ")?);
            match panel.register(candidate) {
                Ok(u) => println!("Usuario registrado: {}", u.username()),
                Err(e) => eprintln!("Error registrando: {}", e),
            }
        }
        "3" => print_products(panel)?,
        "0" => return Ok(false),
        other => println!("Opción inválida: {}", other),
    }
    Ok(true)
}

fn client_menu(panel: &Panel<DynPanelRepository>, user: &User) -> Result<bool, Box<dyn Error>> {
    println!("\n== Cliente: {} ==", user.username());
    println!("1) Ver productos");
    println!("2) Nueva solicitud");
    println!("3) Mis solicitudes");
    println!("4) Nuevo reclamo");
    println!("5) Mis reclamos");
    println!("6) Cerrar sesión");
    println!("0) Salir");
    match prompt("Elige una opción: ")?.trim() {
        "1" => print_products(panel)?,
        "2" => {
            let mut request = NewOrder { client_name: user.name().unwrap_or(user.username()).to_string(),
                                         client_email: user.email().unwrap_or_default().to_string(),
                                         client_phone: user.phone().unwrap_or_default().to_string(),
                                         ..NewOrder::default() };
            loop {
                let id_s = prompt("Id de producto (enter para terminar): ")?;
                if id_s.trim().is_empty() {
                    break;
                }
                let Ok(product_id) = id_s.trim().parse::<u32>() else {
                    eprintln!("Id inválido");
                    continue;
                };
                let Ok(quantity) = prompt("Cantidad: ")?.trim().parse::<u32>() else {
                    eprintln!("Cantidad inválida");
                    continue;
                };
                request.lines.push(OrderLine::new(product_id, quantity));
            }
            for s in panel.check_stock(&request.lines)? {
                println!("Aviso: {} unidades de {} pedidas, hay {}",
                         s.requested,
                         s.product_name.as_deref().unwrap_or("<sin producto>"),
                         s.available);
            }
            match panel.create_order(request) {
                Ok(o) => println!("Solicitud creada: {}", o.id()),
                Err(e) => eprintln!("Error creando solicitud: {}", e),
            }
        }
        "3" => print_summaries(&panel.my_orders()?),
        "4" => {
            let order_s = prompt("Id de solicitud (enter si no aplica): ")?;
            let description = prompt("Descripción: ")?;
            let request = match optional(order_s) {
                Some(id) => NewClaim::for_order(OrderId::from(id), description.trim()),
                None => NewClaim::free_form(description.trim()),
            };
            match panel.create_claim(request) {
                Ok(c) => println!("Reclamo creado: {}", c.id()),
                Err(e) => eprintln!("Error creando reclamo: {}", e),
            }
        }
        "5" => {
            for c in panel.my_claims()? {
                println!("{} | {} | {}", c, c.details().description, c.response().unwrap_or("-"));
            }
        }
        "6" => panel.logout()?,
        "0" => return Ok(false),
        other => println!("Opción inválida: {}", other),
    }
    Ok(true)
}

fn admin_menu(panel: &Panel<DynPanelRepository>, user: &User) -> Result<bool, Box<dyn Error>> {
    println!("\n== Administración: {} ==", user.username());
    println!("1) Estadísticas");
    println!("2) Solicitudes pendientes");
    println!("3) Aprobar solicitud");
    println!("4) Rechazar solicitud");
    println!("5) Despachos (aprobadas)");
    println!("6) Enviar a distribución");
    println!("7) Reclamos abiertos");
    println!("8) Resolver reclamo");
    println!("9) Clientes");
    println!("10) Eliminar usuario");
    println!("11) Cambiar rol");
    println!("12) Cambiar precio / stock");
    println!("13) Cerrar sesión");
    println!("0) Salir");
    match prompt("Elige una opción: ")?.trim() {
        "1" => {
            let s = panel.stats()?;
            println!("Pendientes: {}  Aprobadas: {}  Rechazadas: {}  En distribución: {}  Reclamos abiertos: {}",
                     s.pending,
                     s.approved,
                     s.rejected,
                     s.distribution,
                     s.open_claims);
        }
        "2" => print_summaries(&panel.orders_by_status(OrderStatus::Pending)?),
        choice @ ("3" | "4" | "6") => {
            let id = OrderId::from(prompt("Id de solicitud: ")?.trim());
            let result = match choice {
                "3" => panel.approve_order(&id),
                "4" => panel.reject_order(&id),
                _ => panel.send_to_distribution(&id),
            };
            match result {
                Ok(o) => println!("Solicitud {} -> {}", o.id(), o.status()),
                Err(e) => eprintln!("Error actualizando solicitud: {}", e),
            }
        }
        "5" => print_summaries(&panel.orders_by_status(OrderStatus::Approved)?),
        "7" => {
            for c in panel.claims_by_status(ClaimStatus::Open)? {
                println!("{} | {} | {}", c, c.created_by(), c.details().description);
            }
        }
        "8" => {
            let id = prompt("Id de reclamo: ")?;
            let resolution = match prompt("¿Aceptar? (s/n): ")?.trim().to_lowercase().as_str() {
                "s" => Resolution::Accepted,
                "n" => Resolution::Rejected,
                other => {
                    eprintln!("Opción inválida: {}", other);
                    return Ok(true);
                }
            };
            let response = prompt("Respuesta: ")?;
            match panel.resolve_claim(&id.trim().into(), resolution, response.trim()) {
                Ok(outcome) => {
                    println!("Reclamo cerrado: {}", outcome.claim);
                    if let Some(order) = outcome.order_rolled_back {
                        println!("Solicitud {} revertida a rechazada", order);
                    }
                }
                Err(e) => eprintln!("Error resolviendo reclamo: {}", e),
            }
        }
        "9" => {
            for u in panel.users(Role::Client)? {
                println!("{} | {} | {}", u.username(), u.email().unwrap_or("-"), u.phone().unwrap_or("-"));
            }
        }
        "10" => {
            let username = prompt("Usuario a eliminar: ")?;
            let confirm = prompt(&format!("Confirma borrado de '{}'? escribir 'yes' para confirmar: ", username.trim()))?;
            if confirm.trim().to_lowercase() == "yes" {
                match panel.remove_user(username.trim()) {
                    Ok(r) => println!("Usuario eliminado ({} solicitudes, {} reclamos)", r.orders_removed, r.claims_removed),
                    Err(e) => eprintln!("Error eliminando usuario: {}", e),
                }
            } else {
                println!("Borrado cancelado");
            }
        }
        "11" => {
            let username = prompt("Usuario: ")?;
            let role = match prompt("Rol (admin/client): ")?.trim() {
                "admin" => Role::Admin,
                "client" => Role::Client,
                other => {
                    eprintln!("Rol inválido: {}", other);
                    return Ok(true);
                }
            };
            match panel.set_role(username.trim(), role) {
                Ok(true) => println!("Rol actualizado"),
                Ok(false) => println!("Usuario inexistente"),
                Err(e) => eprintln!("Error cambiando rol: {}", e),
            }
        }
        "12" => {
            let Ok(id) = prompt("Id de producto: ")?.trim().parse::<u32>() else {
                eprintln!("Id inválido");
                return Ok(true);
            };
            if let Ok(price) = prompt("Precio nuevo (enter para no cambiar): ")?.trim().parse::<u64>() {
                if let Err(e) = panel.set_price(id, price) {
                    eprintln!("Error cambiando precio: {}", e);
                }
            }
            if let Ok(stock) = prompt("Stock nuevo (enter para no cambiar): ")?.trim().parse::<u32>() {
                if let Err(e) = panel.set_stock(id, stock) {
                    eprintln!("Error cambiando stock: {}", e);
                }
            }
        }
        "13" => panel.logout()?,
        "0" => return Ok(false),
        other => println!("Opción inválida: {}", other),
    }
    Ok(true)
}

fn print_products(panel: &Panel<DynPanelRepository>) -> Result<(), Box<dyn Error>> {
    println!("\nID  | PRODUCTO                 | STOCK | PRECIO");
    println!("-----------------------------------------------");
    for p in panel.products()? {
        println!("{:<3} | {:<24} | {:>5} | {}", p.id, p.name, p.stock, p.price);
    }
    Ok(())
}

fn print_summaries(summaries: &[OrderSummary]) {
    if summaries.is_empty() {
        println!("(sin solicitudes)");
    }
    for s in summaries {
        let alert = if s.stock_issue { "  [stock insuficiente]" } else { "" };
        println!("{} | {} | {} | total {}{}",
                 s.order.id(),
                 s.order.status(),
                 s.order.created_at().format("%Y-%m-%d %H:%M"),
                 s.total,
                 alert);
    }
}

fn optional(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    read_answer(&mut io::stdin().lock())
}

/// Una línea de `input`; fin de entrada es `UnexpectedEof`.
fn read_answer<B: BufRead>(input: &mut B) -> io::Result<String> {
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "entrada cerrada"));
    }
    Ok(s)
}
