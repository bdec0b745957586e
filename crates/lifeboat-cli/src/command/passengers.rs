use crate::{
    request::PassengerQuery,
    service::{Response, Service},
    util::{self, DataPaths},
};

pub(crate) fn run(paths: &DataPaths, query: &PassengerQuery) -> anyhow::Result<()> {
    let service = Service::start(paths)?;
    let result = service.passengers(query);
    if let Ok(rows) = &result {
        log::debug!("{} passengers matched", rows.len());
    }
    util::print_json(&Response::from_result(result))
}
