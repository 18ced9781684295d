extern crate diffspline;

use diffspline::{check_partials_cs, check_partials_fd, AkimaEngine, Interpolant, InterpOptions, Method, DEFAULT_FD_STEP};

fn main() {

    let x_cp = [1.0, 2.0, 4.0, 6.0, 10.0, 12.0];
    let y_cp = [5.0, 12.0, 14.0, 16.0, 21.0, 29.0];
    let x_interp = [1.3, 2.5, 3.1, 4.7, 5.9, 7.2, 9.9, 11.4, 12.5];

    println!("method;max_abs_error;max_rel_error");
    for method in [Method::Akima, Method::Cubic, Method::BSpline, Method::Slinear] {
        let interpolant = Interpolant::new(method, &InterpOptions::new()).unwrap();
        let check = check_partials_fd(&interpolant, &x_cp, &y_cp, &x_interp, DEFAULT_FD_STEP).unwrap();
        println!("{} fd;{:.3e};{:.3e}", method, check.max_abs_error, check.max_rel_error);
    }

    let akima = AkimaEngine::from_options(&InterpOptions::new().set("delta_x", 0.1)).unwrap();
    let check = check_partials_cs(&akima, &x_cp, &y_cp, &x_interp).unwrap();
    println!("akima cs;{:.3e};{:.3e}", check.max_abs_error, check.max_rel_error);
}
