use log::error;

fn main() {
  match studyplan_server_lib::err_main(None, None) {
    Err(e) => error!("error: {:?}", e),
    Ok(_) => (),
  }
}
