pub mod auth;
pub mod health;
pub mod reset;
pub mod subtasks;
pub mod tasks;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register)
            .service(auth::update_password),
    )
    .service(
        web::scope("/password")
            .service(reset::send_code)
            .service(reset::check_code)
            .service(reset::create_password),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_tasks)
            .service(tasks::get_summary)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/subtasks")
            .service(subtasks::create_subtask)
            .service(subtasks::get_subtask)
            .service(subtasks::update_subtask)
            .service(subtasks::delete_subtask),
    );
}
