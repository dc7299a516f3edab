//! Two-input and parallel multiplexers.

use crate::encoder::{SatEncoder, Timestep};
use volta_ir::SigSpec;
use volta_solve::{Lit, SolverBuilder};

impl<S: SolverBuilder> SatEncoder<'_, S> {
    pub(crate) fn encode_mux(
        &mut self,
        a: &SigSpec,
        b: &SigSpec,
        s: &SigSpec,
        y: &SigSpec,
        t: Timestep,
    ) {
        let va = self.import_tracked(a, t);
        let vb = self.import_tracked(b, t);
        let vs = self.import_tracked(s, t);
        let vy = self.import_tracked(y, t);
        assert!(!vs.is_empty(), "$mux requires a select bit");

        let yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };
        let selected = self.solver().vec_ite(vs[0], &vb, &va);
        self.solver().vec_assume_eq(&selected, &yy);

        if self.models_undef() {
            let ua = self.import_undef(a, t);
            let ub = self.import_undef(b, t);
            let us = self.import_undef(s, t);
            let uy = self.import_undef(y, t);

            // With an undef select, a bit is undef unless both inputs
            // agree and are defined.
            let agree = self.solver().vec_iff(&va, &vb);
            let disagree = self.solver().vec_not(&agree);
            let either_undef = self.solver().vec_or(&ua, &ub);
            let undef_if_s_undef = self.solver().vec_or(&disagree, &either_undef);
            let chosen_undef = self.solver().vec_ite(vs[0], &ub, &ua);
            let yx = self
                .solver()
                .vec_ite(us[0], &undef_if_s_undef, &chosen_undef);
            self.solver().vec_assume_eq(&yx, &uy);
            self.undef_gating(&vy, &yy, &uy);
        }
    }

    pub(crate) fn encode_pmux(
        &mut self,
        safe: bool,
        a: &SigSpec,
        b: &SigSpec,
        s: &SigSpec,
        y: &SigSpec,
        t: Timestep,
    ) {
        let va = self.import_tracked(a, t);
        let vb = self.import_tracked(b, t);
        let vs = self.import_tracked(s, t);
        let vy = self.import_tracked(y, t);
        let width = va.len();
        assert_eq!(
            vb.len(),
            width * vs.len(),
            "$pmux requires |B| = |A| * |S|"
        );
        assert_eq!(vy.len(), width, "$pmux requires |Y| = |A|");

        let yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };

        let mut selected = va.clone();
        for (i, &sel) in vs.iter().enumerate() {
            let part = vb[i * width..(i + 1) * width].to_vec();
            selected = self.solver().vec_ite(sel, &part, &selected);
        }
        if safe {
            let at_most_one = self.solver().onehot(&vs, true);
            selected = self.solver().vec_ite(at_most_one, &selected, &va);
        }
        self.solver().vec_assume_eq(&selected, &yy);

        if self.models_undef() {
            let ua = self.import_undef(a, t);
            let ub = self.import_undef(b, t);
            let us = self.import_undef(s, t);
            let uy = self.import_undef(y, t);

            let mut maybe_one_hot = Lit::FALSE;
            let mut maybe_many_hot = Lit::FALSE;
            let mut sure_one_hot = Lit::FALSE;
            let mut sure_many_hot = Lit::FALSE;

            let mut bits_set = vec![Lit::FALSE; uy.len()];
            let mut bits_clr = vec![Lit::FALSE; uy.len()];

            for (i, &sel) in vs.iter().enumerate() {
                let part_b = vb[i * width..(i + 1) * width].to_vec();
                let part_ub = ub[i * width..(i + 1) * width].to_vec();

                let maybe_s = self.solver().or(sel, us[i]);
                let not_undef_s = self.solver().not(us[i]);
                let sure_s = self.solver().and(sel, not_undef_s);

                // "Many hot" must consult the accumulator from the
                // previous iterations, so it is updated first.
                let repeat = self.solver().and(maybe_one_hot, maybe_s);
                maybe_many_hot = self.solver().or(maybe_many_hot, repeat);
                maybe_one_hot = self.solver().or(maybe_one_hot, maybe_s);

                let sure_repeat = self.solver().and(sure_one_hot, sure_s);
                sure_many_hot = self.solver().or(sure_many_hot, sure_repeat);
                sure_one_hot = self.solver().or(sure_one_hot, sure_s);

                let visible = self.solver().vec_or(&part_b, &part_ub);
                let set_here = self.solver().vec_or(&bits_set, &visible);
                bits_set = self.solver().vec_ite(maybe_s, &set_here, &bits_set);

                let nb = self.solver().vec_not(&part_b);
                let invisible = self.solver().vec_or(&nb, &part_ub);
                let clr_here = self.solver().vec_or(&bits_clr, &invisible);
                bits_clr = self.solver().vec_ite(maybe_s, &clr_here, &bits_clr);
            }

            let mut maybe_a = self.solver().not(maybe_one_hot);

            if safe {
                maybe_a = self.solver().or(maybe_a, maybe_many_hot);
                let a_visible = self.solver().vec_or(&va, &ua);
                bits_set = self.solver().vec_ite(sure_many_hot, &a_visible, &bits_set);
                let na = self.solver().vec_not(&va);
                let a_invisible = self.solver().vec_or(&na, &ua);
                bits_clr = self.solver().vec_ite(sure_many_hot, &a_invisible, &bits_clr);
            }

            let a_visible = self.solver().vec_or(&va, &ua);
            let set_a = self.solver().vec_or(&bits_set, &a_visible);
            bits_set = self.solver().vec_ite(maybe_a, &set_a, &bits_set);
            let na = self.solver().vec_not(&va);
            let a_invisible = self.solver().vec_or(&na, &ua);
            let clr_a = self.solver().vec_or(&bits_clr, &a_invisible);
            bits_clr = self.solver().vec_ite(maybe_a, &clr_a, &bits_clr);

            // A bit is undef iff it is simultaneously maybe-set and
            // maybe-cleared; set and clear together cover every bit, so
            // the negated XOR is exactly the conjunction.
            let xor = self.solver().vec_xor(&bits_set, &bits_clr);
            let yx = self.solver().vec_not(&xor);
            self.solver().vec_assume_eq(&yx, &uy);
            self.undef_gating(&vy, &yy, &uy);
        }
    }
}
