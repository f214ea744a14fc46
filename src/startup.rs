use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::Settings,
    routes::{company_route, default_route},
};

pub fn run(listener: TcpListener, settings: Settings) -> Result<Server, std::io::Error> {
    let settings = web::Data::new(settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(
                web::scope("/company")
                    .service(company_route::search)
                    .service(company_route::detail),
            )
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
